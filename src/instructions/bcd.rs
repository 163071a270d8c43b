//! `DAA/DAS/AAA/AAS/AAM/AAD`: classic BCD/ASCII adjustments, all
//! operating on `AL`/`AH` directly.

use crate::alu;
use crate::cpu::Cpu;
use crate::decode::{Instruction, Operand};
use crate::error::Result;

pub fn daa(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    alu::daa(&mut cpu.regs);
    Ok(())
}

pub fn das(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    alu::das(&mut cpu.regs);
    Ok(())
}

pub fn aaa(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    alu::aaa(&mut cpu.regs);
    Ok(())
}

pub fn aas(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    alu::aas(&mut cpu.regs);
    Ok(())
}

fn immediate_base(instr: &Instruction) -> u8 {
    match instr.arg1 {
        Operand::Constant(v) => v as u8,
        _ => 10,
    }
}

pub fn aam(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let base = immediate_base(instr);
    match alu::aam(&mut cpu.regs, base) {
        Some(()) => Ok(()),
        None => cpu.raise_interrupt(0),
    }
}

pub fn aad(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let base = immediate_base(instr);
    alu::aad(&mut cpu.regs, base);
    Ok(())
}
