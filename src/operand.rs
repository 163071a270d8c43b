//! Resolves a decoded [`Operand`] against live CPU state: computes
//! effective addresses (applying the segment-override rule), and reads
//! or writes the operand's value. Nothing here advances `IP` — that
//! already happened during decode.

use crate::bus::{linear, Bus};
use crate::decode::{Operand, RmKind, SegReg};
use crate::error::Result;
use crate::register::{Reg16, RegisterFile};

/// `[BX+SI]` etc. default to `DS`; anything built on `BP` defaults to
/// `SS`. An explicit segment-override prefix always wins.
pub fn effective_segment(regs: &RegisterFile, rm: RmKind, over: Option<SegReg>) -> u16 {
    if let Some(seg) = over {
        return regs.get16(seg.to_reg16());
    }
    let default = if rm.defaults_to_stack_segment() { Reg16::Ss } else { Reg16::Ds };
    regs.get16(default)
}

fn rm_offset(regs: &RegisterFile, rm: RmKind, disp: i16) -> u16 {
    let base = match rm {
        RmKind::BxSi => regs.get16(Reg16::Bx).wrapping_add(regs.get16(Reg16::Si)),
        RmKind::BxDi => regs.get16(Reg16::Bx).wrapping_add(regs.get16(Reg16::Di)),
        RmKind::BpSi => regs.get16(Reg16::Bp).wrapping_add(regs.get16(Reg16::Si)),
        RmKind::BpDi => regs.get16(Reg16::Bp).wrapping_add(regs.get16(Reg16::Di)),
        RmKind::Si => regs.get16(Reg16::Si),
        RmKind::Di => regs.get16(Reg16::Di),
        RmKind::Bp => regs.get16(Reg16::Bp),
        RmKind::Bx => regs.get16(Reg16::Bx),
    };
    base.wrapping_add(disp as u16)
}

/// The linear address an operand refers to, for the memory-shaped
/// variants. `Memory` uses `DS` (or the override) directly since it
/// carries no base register to decide the stack-segment default.
pub fn effective_address(regs: &RegisterFile, operand: Operand, over: Option<SegReg>) -> Option<u32> {
    match operand {
        Operand::Memory(offset) => {
            let seg = over.map(|s| regs.get16(s.to_reg16())).unwrap_or_else(|| regs.get16(Reg16::Ds));
            Some(linear(seg, offset))
        }
        Operand::Dereference(rm, disp) => {
            let seg = effective_segment(regs, rm, over);
            Some(linear(seg, rm_offset(regs, rm, disp)))
        }
        _ => None,
    }
}

pub fn read8(regs: &RegisterFile, bus: &Bus, operand: Operand, over: Option<SegReg>) -> Result<u8> {
    Ok(match operand {
        Operand::Register8(r) => regs.get8(r),
        Operand::Constant(v) => v as u8,
        _ => bus.read_u8(effective_address(regs, operand, over).expect("operand is not readable as a byte"))?,
    })
}

pub fn read16(regs: &RegisterFile, bus: &Bus, operand: Operand, over: Option<SegReg>) -> Result<u16> {
    Ok(match operand {
        Operand::Register16(r) => regs.get16(r),
        Operand::SegRegister(s) => regs.get16(s.to_reg16()),
        Operand::Constant(v) => v as u16,
        _ => bus.read_u16(effective_address(regs, operand, over).expect("operand is not readable as a word"))?,
    })
}

pub fn write8(regs: &mut RegisterFile, bus: &mut Bus, operand: Operand, over: Option<SegReg>, value: u8) -> Result<()> {
    match operand {
        Operand::Register8(r) => regs.set8(r, value),
        _ => bus.write_u8(effective_address(regs, operand, over).expect("operand is not writable as a byte"), value)?,
    }
    Ok(())
}

pub fn write16(regs: &mut RegisterFile, bus: &mut Bus, operand: Operand, over: Option<SegReg>, value: u16) -> Result<()> {
    match operand {
        Operand::Register16(r) => regs.set16(r, value),
        Operand::SegRegister(s) => regs.set16(s.to_reg16(), value),
        _ => bus.write_u16(effective_address(regs, operand, over).expect("operand is not writable as a word"), value)?,
    }
    Ok(())
}

/// The 16-bit offset alone, without combining it with a segment —
/// what `LEA`/`LDS`/`LES` need from their memory operand.
pub fn effective_offset(regs: &RegisterFile, operand: Operand) -> u16 {
    match operand {
        Operand::Memory(offset) => offset,
        Operand::Dereference(rm, disp) => rm_offset(regs, rm, disp),
        _ => unreachable!("effective_offset is only called on memory-shaped operands"),
    }
}

/// Shift/rotate count operand: `1`, `CL`, or an immediate byte.
pub fn read_count(regs: &RegisterFile, operand: Operand) -> Result<u32> {
    Ok(match operand {
        Operand::Register8(r) => regs.get8(r) as u32,
        Operand::Constant(v) => v as u32,
        _ => unreachable!("shift/rotate count operand is always a register or constant"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;

    fn bus() -> Bus {
        Bus::new(&vec![0u8; crate::bus::BIOS_SIZE], 0x100000).unwrap()
    }

    #[test]
    fn bp_forms_default_to_stack_segment() {
        let mut regs = RegisterFile::new();
        regs.set16(Reg16::Ss, 0x2000);
        regs.set16(Reg16::Ds, 0x3000);
        regs.set16(Reg16::Bp, 0x10);
        let addr = effective_address(&regs, Operand::Dereference(RmKind::Bp, 4), None).unwrap();
        assert_eq!(addr, linear(0x2000, 0x14));
    }

    #[test]
    fn explicit_override_beats_default_segment() {
        let mut regs = RegisterFile::new();
        regs.set16(Reg16::Es, 0x1000);
        regs.set16(Reg16::Bx, 0x10);
        let addr = effective_address(&regs, Operand::Dereference(RmKind::Bx, 0), Some(SegReg::Es)).unwrap();
        assert_eq!(addr, linear(0x1000, 0x10));
    }

    #[test]
    fn register_round_trip() {
        let mut regs = RegisterFile::new();
        let mut b = bus();
        write16(&mut regs, &mut b, Operand::Register16(Reg16::Bx), None, 0xBEEF).unwrap();
        assert_eq!(read16(&regs, &b, Operand::Register16(Reg16::Bx), None).unwrap(), 0xBEEF);
    }

    #[test]
    fn memory_write_then_read() {
        let mut regs = RegisterFile::new();
        regs.set16(Reg16::Ds, 0);
        let mut b = bus();
        write16(&mut regs, &mut b, Operand::Memory(0x500), None, 0x1234).unwrap();
        assert_eq!(read16(&regs, &b, Operand::Memory(0x500), None).unwrap(), 0x1234);
    }
}
