//! `ADD/ADC/SUB/SBB/CMP/INC/DEC/NEG`: read operands, compute, update
//! flags, write back everywhere except `CMP`.

use super::width_of;
use crate::alu;
use crate::cpu::Cpu;
use crate::decode::{Instruction, InstructionKind};
use crate::error::Result;
use crate::operand::{read16, read8, write16, write8};

fn binary(cpu: &mut Cpu, instr: &Instruction, write_result: bool) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    let carry_in = if matches!(instr.kind, InstructionKind::Adc | InstructionKind::Sbb) {
        cpu.regs.flag(crate::register::flag::CF) as u32
    } else {
        0
    };

    if width == alu::Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let b = read8(&cpu.regs, &cpu.bus, instr.arg2, over)? as u32;
        let result = match instr.kind {
            InstructionKind::Add | InstructionKind::Adc => alu::add(&mut cpu.regs, a, b, carry_in, width),
            InstructionKind::Sub | InstructionKind::Sbb | InstructionKind::Cmp => {
                alu::sub(&mut cpu.regs, a, b, carry_in, width)
            }
            _ => unreachable!("binary() is only called for ADD/ADC/SUB/SBB/CMP"),
        };
        if write_result {
            write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, result as u8)?;
        }
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let b = read16(&cpu.regs, &cpu.bus, instr.arg2, over)? as u32;
        let result = match instr.kind {
            InstructionKind::Add | InstructionKind::Adc => alu::add(&mut cpu.regs, a, b, carry_in, width),
            InstructionKind::Sub | InstructionKind::Sbb | InstructionKind::Cmp => {
                alu::sub(&mut cpu.regs, a, b, carry_in, width)
            }
            _ => unreachable!("binary() is only called for ADD/ADC/SUB/SBB/CMP"),
        };
        if write_result {
            write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, result as u16)?;
        }
    }
    Ok(())
}

pub fn add(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn adc(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn sub(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn sbb(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn cmp(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, false)
}

pub fn inc(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == alu::Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = alu::inc(&mut cpu.regs, a, width);
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u8)
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = alu::inc(&mut cpu.regs, a, width);
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u16)
    }
}

pub fn dec(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == alu::Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = alu::dec(&mut cpu.regs, a, width);
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u8)
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = alu::dec(&mut cpu.regs, a, width);
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u16)
    }
}

pub fn neg(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == alu::Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = alu::neg(&mut cpu.regs, a, width);
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u8)
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = alu::neg(&mut cpu.regs, a, width);
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u16)
    }
}
