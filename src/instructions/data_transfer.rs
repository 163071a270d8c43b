//! `MOV/XCHG/PUSH/POP/PUSHF/POPF/LEA/LDS/LES/XLAT/LAHF/SAHF/CBW/CWD`.
//! None of these touch arithmetic flags except `POPF` (which loads
//! the whole word) and `SAHF` (which loads the low byte).

use super::width_of;
use crate::alu::{self, Width};
use crate::bus::linear;
use crate::cpu::Cpu;
use crate::decode::{Instruction, Operand};
use crate::error::Result;
use crate::operand::{effective_address, effective_offset, read16, read8, write16, write8};
use crate::register::{Reg16, Reg8};

pub fn mov(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let over = instr.segment_override;
    if width_of(instr) == Width::Byte {
        let v = read8(&cpu.regs, &cpu.bus, instr.arg2, over)?;
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, v)
    } else {
        let v = read16(&cpu.regs, &cpu.bus, instr.arg2, over)?;
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, v)
    }
}

pub fn xchg(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let over = instr.segment_override;
    if width_of(instr) == Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)?;
        let b = read8(&cpu.regs, &cpu.bus, instr.arg2, over)?;
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, b)?;
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg2, over, a)
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)?;
        let b = read16(&cpu.regs, &cpu.bus, instr.arg2, over)?;
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, b)?;
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg2, over, a)
    }
}

/// `PUSH SP` pushes the already-decremented `SP` (the 8086 bug, fixed
/// on the 80286): `SP` must be read *after* the decrement, so the
/// general operand-read path (which would read the pre-decrement
/// value) can't be used for that one case.
pub fn push(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    if instr.arg1 == Operand::Register16(Reg16::Sp) {
        let sp = cpu.regs.get16(Reg16::Sp).wrapping_sub(2);
        cpu.regs.set16(Reg16::Sp, sp);
        let ss = cpu.regs.get16(Reg16::Ss);
        return cpu.bus.write_u16(linear(ss, sp), sp);
    }
    let v = read16(&cpu.regs, &cpu.bus, instr.arg1, instr.segment_override)?;
    cpu.push16(v)
}

pub fn pop(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let v = cpu.pop16()?;
    write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, instr.segment_override, v)
}

pub fn pushf(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    let flags = cpu.regs.flags();
    cpu.push16(flags)
}

pub fn popf(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    let v = cpu.pop16()?;
    cpu.regs.set_flags(v);
    Ok(())
}

pub fn lea(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let offset = effective_offset(&cpu.regs, instr.arg2);
    write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, instr.segment_override, offset)
}

fn load_far_pointer(cpu: &mut Cpu, instr: &Instruction, seg_reg: Reg16) -> Result<()> {
    let addr = effective_address(&cpu.regs, instr.arg2, instr.segment_override)
        .expect("LDS/LES source is always memory-shaped");
    let offset = cpu.bus.read_u16(addr)?;
    let segment = cpu.bus.read_u16(addr.wrapping_add(2))?;
    write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, None, offset)?;
    cpu.regs.set16(seg_reg, segment);
    Ok(())
}

pub fn lds(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    load_far_pointer(cpu, instr, Reg16::Ds)
}

pub fn les(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    load_far_pointer(cpu, instr, Reg16::Es)
}

/// `AL = [DS:(BX+AL)]`, segment overridable.
pub fn xlat(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let seg = instr
        .segment_override
        .map(|s| cpu.regs.get16(s.to_reg16()))
        .unwrap_or_else(|| cpu.regs.get16(Reg16::Ds));
    let offset = cpu.regs.get16(Reg16::Bx).wrapping_add(cpu.regs.get8(Reg8::Al) as u16);
    let v = cpu.bus.read_u8(linear(seg, offset))?;
    cpu.regs.set8(Reg8::Al, v);
    Ok(())
}

pub fn lahf(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set8(Reg8::Ah, cpu.regs.flags() as u8);
    Ok(())
}

pub fn sahf(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    let ah = cpu.regs.get8(Reg8::Ah);
    let flags = (cpu.regs.flags() & 0xFF00) | ah as u16;
    cpu.regs.set_flags(flags);
    Ok(())
}

pub fn cbw(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    alu::cbw(&mut cpu.regs);
    Ok(())
}

pub fn cwd(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    alu::cwd(&mut cpu.regs);
    Ok(())
}
