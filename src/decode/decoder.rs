//! Prefix loop, opcode lookup, ModR/M consumption and group
//! resolution, operand-template materialization. This is the only
//! function in the crate that turns raw bytes into an [`Instruction`].

use super::modrm::ModRm;
use super::table::{self, GroupId, OperandTemplate};
use super::{
    InstrFlags, Instruction, InstructionKind, Operand, SegReg, PREFIX_LOCK, PREFIX_REPNE,
    PREFIX_REP,
};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::register::{Reg16, Reg8};

static SEGMENT_PREFIXES: phf::Map<u8, SegReg> = phf::phf_map! {
    0x26u8 => SegReg::Es,
    0x2Eu8 => SegReg::Cs,
    0x36u8 => SegReg::Ss,
    0x3Eu8 => SegReg::Ds,
};

pub fn decode(fetcher: &mut Fetcher) -> Result<Instruction> {
    let mut segment_override = None;
    let mut opcode_prefix = 0u8;
    let mut opcode = fetcher.fetch_u8()?;

    loop {
        if let Some(seg) = SEGMENT_PREFIXES.get(&opcode) {
            segment_override = Some(*seg);
            opcode = fetcher.fetch_u8()?;
            continue;
        }
        if matches!(opcode, PREFIX_LOCK | PREFIX_REPNE | PREFIX_REP) {
            opcode_prefix = opcode;
            opcode = fetcher.fetch_u8()?;
            continue;
        }
        break;
    }

    if opcode == 0x0F {
        let sub = fetcher.fetch_u8()?;
        if sub == 0x0F {
            let trap_fn = fetcher.fetch_u8()?;
            return Ok(Instruction {
                kind: InstructionKind::EmulatorTrap,
                flags: InstrFlags::empty(),
                segment_override,
                opcode_prefix,
                arg1: Operand::Constant(trap_fn as i32),
                arg2: Operand::None,
            });
        }
        return Ok(Instruction {
            kind: InstructionKind::Invalid,
            flags: InstrFlags::empty(),
            segment_override,
            opcode_prefix,
            arg1: Operand::None,
            arg2: Operand::None,
        });
    }

    let mut entry = table::lookup(opcode);

    let modrm = if entry.flags.contains(InstrFlags::HAS_RM) {
        Some(ModRm::decode(fetcher.fetch_u8()?))
    } else {
        None
    };

    if let OperandTemplate::Group(group) = entry.arg1 {
        let reg = modrm.expect("group opcodes always carry a ModR/M byte").reg;
        entry.kind = match group {
            GroupId::Group1 => table::group1(reg),
            GroupId::Group2 => table::group2(reg),
            GroupId::Group3 => {
                let (kind, _) = table::group3(reg);
                if kind == InstructionKind::Test {
                    entry.arg2 = if entry.flags.contains(InstrFlags::SIZE8) {
                        OperandTemplate::Ib
                    } else {
                        OperandTemplate::Iw
                    };
                }
                kind
            }
            GroupId::Group4 => table::group4(reg),
            GroupId::Group5 => table::group5(reg),
        };
        entry.arg1 = OperandTemplate::E;
    }

    let size8 = entry.flags.contains(InstrFlags::SIZE8);
    let arg1 = materialize(entry.arg1, size8, entry.flags, fetcher, modrm)?;
    let arg2 = materialize(entry.arg2, size8, entry.flags, fetcher, modrm)?;

    Ok(Instruction {
        kind: entry.kind,
        flags: entry.flags,
        segment_override,
        opcode_prefix,
        arg1,
        arg2,
    })
}

fn materialize(
    template: OperandTemplate,
    size8: bool,
    flags: InstrFlags,
    fetcher: &mut Fetcher,
    modrm: Option<ModRm>,
) -> Result<Operand> {
    use OperandTemplate::*;
    Ok(match template {
        None => Operand::None,
        Accumulator => {
            if size8 {
                Operand::Register8(Reg8::Al)
            } else {
                Operand::Register16(Reg16::Ax)
            }
        }
        Cl => Operand::Register8(Reg8::Cl),
        Dx => Operand::Register16(Reg16::Dx),
        One => Operand::Constant(1),
        Three => Operand::Constant(3),
        FixedReg16(n) => {
            if size8 {
                Operand::Register8(super::modrm::byte_register(n))
            } else {
                Operand::Register16(super::modrm::word_register(n))
            }
        }
        FixedSeg(seg) => Operand::SegRegister(seg),
        Ib => {
            let byte = fetcher.fetch_u8()?;
            let value = if flags.contains(InstrFlags::SIGN_EXTEND) {
                byte as i8 as i32
            } else {
                byte as i32
            };
            Operand::Constant(value)
        }
        Iw => Operand::Constant(fetcher.fetch_u16()? as i32),
        Jb => Operand::Constant(fetcher.fetch_u8()? as i8 as i32),
        Jw => Operand::Constant(fetcher.fetch_u16()? as i16 as i32),
        Ob => Operand::Memory(fetcher.fetch_u16()?),
        Ap => {
            let offset = fetcher.fetch_u16()?;
            let segment = fetcher.fetch_u16()?;
            Operand::FarPointer { segment, offset }
        }
        E => modrm
            .expect("E template requires a ModR/M byte")
            .rm_operand(fetcher, size8)?,
        M => modrm
            .expect("M template requires a ModR/M byte")
            .rm_operand(fetcher, size8)?,
        G => {
            let m = modrm.expect("G template requires a ModR/M byte");
            if size8 {
                Operand::Register8(m.reg8())
            } else {
                Operand::Register16(m.reg16())
            }
        }
        S => {
            let m = modrm.expect("S template requires a ModR/M byte");
            Operand::SegRegister(match m.reg & 0b11 {
                0 => SegReg::Es,
                1 => SegReg::Cs,
                2 => SegReg::Ss,
                _ => SegReg::Ds,
            })
        }
        Group(_) => unreachable!("groups are resolved before materialization"),
    })
}
