//! `MUL/IMUL/DIV/IDIV`: widen through `AX`/`DX:AX`. Divide errors
//! (zero divisor or quotient overflow) raise software interrupt 0
//! rather than an `Err`, matching real 8086 behavior.

use super::width_of;
use crate::alu::{self, Width};
use crate::cpu::Cpu;
use crate::decode::Instruction;
use crate::error::Result;
use crate::operand::{read16, read8};
use crate::register::{Reg16, Reg8};

pub fn mul(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == Width::Byte {
        let a = cpu.regs.get8(Reg8::Al) as u32;
        let b = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let full = alu::mul(&mut cpu.regs, a, b, width);
        cpu.regs.set16(Reg16::Ax, full as u16);
    } else {
        let a = cpu.regs.get16(Reg16::Ax) as u32;
        let b = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let full = alu::mul(&mut cpu.regs, a, b, width);
        cpu.regs.set16(Reg16::Ax, full as u16);
        cpu.regs.set16(Reg16::Dx, (full >> 16) as u16);
    }
    Ok(())
}

pub fn imul(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == Width::Byte {
        let a = cpu.regs.get8(Reg8::Al) as i8 as i32;
        let b = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as i8 as i32;
        let full = alu::imul(&mut cpu.regs, a, b, width);
        cpu.regs.set16(Reg16::Ax, full as u16);
    } else {
        let a = cpu.regs.get16(Reg16::Ax) as i16 as i32;
        let b = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as i16 as i32;
        let full = alu::imul(&mut cpu.regs, a, b, width);
        cpu.regs.set16(Reg16::Ax, full as u16);
        cpu.regs.set16(Reg16::Dx, (full >> 16) as u16);
    }
    Ok(())
}

pub fn div(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == Width::Byte {
        let dividend = cpu.regs.get16(Reg16::Ax) as u32;
        let divisor = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        match alu::divu(dividend, divisor, width) {
            Some((q, r)) => {
                cpu.regs.set8(Reg8::Al, q as u8);
                cpu.regs.set8(Reg8::Ah, r as u8);
            }
            None => cpu.raise_interrupt(0)?,
        }
    } else {
        let dividend = ((cpu.regs.get16(Reg16::Dx) as u32) << 16) | cpu.regs.get16(Reg16::Ax) as u32;
        let divisor = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        match alu::divu(dividend, divisor, width) {
            Some((q, r)) => {
                cpu.regs.set16(Reg16::Ax, q as u16);
                cpu.regs.set16(Reg16::Dx, r as u16);
            }
            None => cpu.raise_interrupt(0)?,
        }
    }
    Ok(())
}

pub fn idiv(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == Width::Byte {
        let dividend = cpu.regs.get16(Reg16::Ax) as i16 as i32;
        let divisor = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as i8 as i32;
        match alu::divs(dividend, divisor, width) {
            Some((q, r)) => {
                cpu.regs.set8(Reg8::Al, q as u8);
                cpu.regs.set8(Reg8::Ah, r as u8);
            }
            None => cpu.raise_interrupt(0)?,
        }
    } else {
        let dividend = (((cpu.regs.get16(Reg16::Dx) as u32) << 16) | cpu.regs.get16(Reg16::Ax) as u32) as i32;
        let divisor = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as i16 as i32;
        match alu::divs(dividend, divisor, width) {
            Some((q, r)) => {
                cpu.regs.set16(Reg16::Ax, q as u16);
                cpu.regs.set16(Reg16::Dx, r as u16);
            }
            None => cpu.raise_interrupt(0)?,
        }
    }
    Ok(())
}
