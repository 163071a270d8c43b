//! `MOVS/CMPS/SCAS/LODS/STOS`, including the `REP`/`REPNE` prefixes.
//! Source defaults to `DS:SI` (overridable); destination is always
//! `ES:DI`. A repeat prefix runs the whole loop within this one
//! dispatch call — there are no suspension points mid-instruction.

use super::width_of;
use crate::alu::{self, Width};
use crate::bus::linear;
use crate::cpu::Cpu;
use crate::decode::{Instruction, PREFIX_REP, PREFIX_REPNE};
use crate::error::Result;
use crate::register::{flag, Reg16, Reg8};

fn step_amount(width: Width) -> u16 {
    match width {
        Width::Byte => 1,
        Width::Word => 2,
    }
}

fn advance(cpu: &mut Cpu, reg: Reg16, width: Width) {
    let df = cpu.regs.flag(flag::DF);
    let amount = step_amount(width);
    let cur = cpu.regs.get16(reg);
    cpu.regs.set16(reg, if df { cur.wrapping_sub(amount) } else { cur.wrapping_add(amount) });
}

fn source_segment(cpu: &Cpu, instr: &Instruction) -> u16 {
    instr
        .segment_override
        .map(|s| cpu.regs.get16(s.to_reg16()))
        .unwrap_or_else(|| cpu.regs.get16(Reg16::Ds))
}

fn movs_once(cpu: &mut Cpu, instr: &Instruction, width: Width) -> Result<()> {
    let src_seg = source_segment(cpu, instr);
    let si = cpu.regs.get16(Reg16::Si);
    let es = cpu.regs.get16(Reg16::Es);
    let di = cpu.regs.get16(Reg16::Di);
    match width {
        Width::Byte => {
            let v = cpu.bus.read_u8(linear(src_seg, si))?;
            cpu.bus.write_u8(linear(es, di), v)?;
        }
        Width::Word => {
            let v = cpu.bus.read_u16(linear(src_seg, si))?;
            cpu.bus.write_u16(linear(es, di), v)?;
        }
    }
    advance(cpu, Reg16::Si, width);
    advance(cpu, Reg16::Di, width);
    Ok(())
}

fn cmps_once(cpu: &mut Cpu, instr: &Instruction, width: Width) -> Result<()> {
    let src_seg = source_segment(cpu, instr);
    let si = cpu.regs.get16(Reg16::Si);
    let es = cpu.regs.get16(Reg16::Es);
    let di = cpu.regs.get16(Reg16::Di);
    match width {
        Width::Byte => {
            let a = cpu.bus.read_u8(linear(src_seg, si))?;
            let b = cpu.bus.read_u8(linear(es, di))?;
            alu::sub(&mut cpu.regs, a as u32, b as u32, 0, width);
        }
        Width::Word => {
            let a = cpu.bus.read_u16(linear(src_seg, si))?;
            let b = cpu.bus.read_u16(linear(es, di))?;
            alu::sub(&mut cpu.regs, a as u32, b as u32, 0, width);
        }
    }
    advance(cpu, Reg16::Si, width);
    advance(cpu, Reg16::Di, width);
    Ok(())
}

fn scas_once(cpu: &mut Cpu, width: Width) -> Result<()> {
    let es = cpu.regs.get16(Reg16::Es);
    let di = cpu.regs.get16(Reg16::Di);
    match width {
        Width::Byte => {
            let a = cpu.regs.get8(Reg8::Al);
            let b = cpu.bus.read_u8(linear(es, di))?;
            alu::sub(&mut cpu.regs, a as u32, b as u32, 0, width);
        }
        Width::Word => {
            let a = cpu.regs.get16(Reg16::Ax);
            let b = cpu.bus.read_u16(linear(es, di))?;
            alu::sub(&mut cpu.regs, a as u32, b as u32, 0, width);
        }
    }
    advance(cpu, Reg16::Di, width);
    Ok(())
}

fn lods_once(cpu: &mut Cpu, instr: &Instruction, width: Width) -> Result<()> {
    let src_seg = source_segment(cpu, instr);
    let si = cpu.regs.get16(Reg16::Si);
    match width {
        Width::Byte => {
            let v = cpu.bus.read_u8(linear(src_seg, si))?;
            cpu.regs.set8(Reg8::Al, v);
        }
        Width::Word => {
            let v = cpu.bus.read_u16(linear(src_seg, si))?;
            cpu.regs.set16(Reg16::Ax, v);
        }
    }
    advance(cpu, Reg16::Si, width);
    Ok(())
}

fn stos_once(cpu: &mut Cpu, width: Width) -> Result<()> {
    let es = cpu.regs.get16(Reg16::Es);
    let di = cpu.regs.get16(Reg16::Di);
    match width {
        Width::Byte => cpu.bus.write_u8(linear(es, di), cpu.regs.get8(Reg8::Al))?,
        Width::Word => cpu.bus.write_u16(linear(es, di), cpu.regs.get16(Reg16::Ax))?,
    }
    advance(cpu, Reg16::Di, width);
    Ok(())
}

/// Runs `body` once per iteration, handling the `REP`/`REPNE` prefix's
/// `CX` countdown and (for `CMPS`/`SCAS`) its `ZF` termination.
fn repeat(cpu: &mut Cpu, instr: &Instruction, compares: bool, mut body: impl FnMut(&mut Cpu) -> Result<()>) -> Result<()> {
    if !matches!(instr.opcode_prefix, PREFIX_REP | PREFIX_REPNE) {
        return body(cpu);
    }
    while cpu.regs.get16(Reg16::Cx) != 0 {
        body(cpu)?;
        let cx = cpu.regs.get16(Reg16::Cx).wrapping_sub(1);
        cpu.regs.set16(Reg16::Cx, cx);
        if compares {
            let zf = cpu.regs.flag(flag::ZF);
            match instr.opcode_prefix {
                PREFIX_REP if !zf => break,
                PREFIX_REPNE if zf => break,
                _ => {}
            }
        }
        if cx == 0 {
            break;
        }
    }
    Ok(())
}

pub fn movs(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    repeat(cpu, instr, false, |cpu| movs_once(cpu, instr, width))
}

pub fn cmps(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    repeat(cpu, instr, true, |cpu| cmps_once(cpu, instr, width))
}

pub fn scas(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    repeat(cpu, instr, true, |cpu| scas_once(cpu, width))
}

pub fn lods(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    repeat(cpu, instr, false, |cpu| lods_once(cpu, instr, width))
}

pub fn stos(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    repeat(cpu, instr, false, |cpu| stos_once(cpu, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{InstrFlags, InstructionKind, Operand};

    fn cpu() -> Cpu {
        Cpu::new(&vec![0u8; crate::bus::BIOS_SIZE], 0x100000).unwrap()
    }

    fn instr(kind: InstructionKind, prefix: u8, size8: bool) -> Instruction {
        Instruction {
            kind,
            flags: if size8 { InstrFlags::SIZE8 } else { InstrFlags::empty() },
            segment_override: None,
            opcode_prefix: prefix,
            arg1: Operand::None,
            arg2: Operand::None,
        }
    }

    #[test]
    fn rep_movsb_copies_cx_bytes() {
        let mut c = cpu();
        c.set_register(Reg16::Ds, 0);
        c.set_register(Reg16::Es, 0);
        c.set_register(Reg16::Si, 0x1000);
        c.set_register(Reg16::Di, 0x2000);
        c.set_register(Reg16::Cx, 4);
        c.write_bytes(0x1000, &[1, 2, 3, 4]).unwrap();
        movs(&mut c, &instr(InstructionKind::Movs, PREFIX_REP, true)).unwrap();
        assert_eq!(c.read_bytes(0x2000, 4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(c.get_register(Reg16::Cx), 0);
        assert_eq!(c.get_register(Reg16::Si), 0x1004);
        assert_eq!(c.get_register(Reg16::Di), 0x2004);
    }

    #[test]
    fn movsb_without_prefix_runs_once() {
        let mut c = cpu();
        c.set_register(Reg16::Ds, 0);
        c.set_register(Reg16::Es, 0);
        c.set_register(Reg16::Si, 0x1000);
        c.set_register(Reg16::Di, 0x2000);
        c.write_bytes(0x1000, &[0xAB]).unwrap();
        movs(&mut c, &instr(InstructionKind::Movs, 0, true)).unwrap();
        assert_eq!(c.read_bytes(0x2000, 1).unwrap(), vec![0xAB]);
        assert_eq!(c.get_register(Reg16::Si), 0x1001);
    }

    #[test]
    fn repe_cmpsb_stops_on_mismatch() {
        let mut c = cpu();
        c.set_register(Reg16::Ds, 0);
        c.set_register(Reg16::Es, 0);
        c.set_register(Reg16::Si, 0x1000);
        c.set_register(Reg16::Di, 0x2000);
        c.set_register(Reg16::Cx, 5);
        c.write_bytes(0x1000, &[1, 2, 3, 4, 5]).unwrap();
        c.write_bytes(0x2000, &[1, 2, 9, 4, 5]).unwrap();
        cmps(&mut c, &instr(InstructionKind::Cmps, PREFIX_REP, true)).unwrap();
        // stops after comparing index 2 (mismatch), having consumed 3 bytes
        assert_eq!(c.get_register(Reg16::Cx), 2);
        assert_eq!(c.get_register(Reg16::Si), 0x1003);
    }

    #[test]
    fn lods_does_not_advance_di_stos_does_not_advance_si() {
        let mut c = cpu();
        c.set_register(Reg16::Ds, 0);
        c.set_register(Reg16::Es, 0);
        c.set_register(Reg16::Si, 0x1000);
        c.set_register(Reg16::Di, 0x2000);
        c.write_bytes(0x1000, &[0x77]).unwrap();
        lods(&mut c, &instr(InstructionKind::Lods, 0, true)).unwrap();
        assert_eq!(c.get_register8(Reg8::Al), 0x77);
        assert_eq!(c.get_register(Reg16::Di), 0x2000);
        stos(&mut c, &instr(InstructionKind::Stos, 0, true)).unwrap();
        assert_eq!(c.get_register(Reg16::Si), 0x1000);
        assert_eq!(c.read_bytes(0x2000, 1).unwrap(), vec![0x77]);
    }
}
