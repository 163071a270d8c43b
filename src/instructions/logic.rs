//! `AND/OR/XOR/TEST/NOT`.

use super::width_of;
use crate::alu::{self, Width};
use crate::cpu::Cpu;
use crate::decode::{Instruction, InstructionKind};
use crate::error::Result;
use crate::operand::{read16, read8, write16, write8};

fn binary(cpu: &mut Cpu, instr: &Instruction, write_result: bool) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    let op = match instr.kind {
        InstructionKind::And | InstructionKind::Test => alu::and,
        InstructionKind::Or => alu::or,
        InstructionKind::Xor => alu::xor,
        _ => unreachable!("binary() is only called for AND/OR/XOR/TEST"),
    };

    if width == Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let b = read8(&cpu.regs, &cpu.bus, instr.arg2, over)? as u32;
        let r = op(&mut cpu.regs, a, b, width);
        if write_result {
            write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u8)?;
        }
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let b = read16(&cpu.regs, &cpu.bus, instr.arg2, over)? as u32;
        let r = op(&mut cpu.regs, a, b, width);
        if write_result {
            write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u16)?;
        }
    }
    Ok(())
}

pub fn and(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn or(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn xor(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, true)
}

pub fn test(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    binary(cpu, instr, false)
}

pub fn not(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    if width == Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)?;
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, !a)
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)?;
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, !a)
    }
}
