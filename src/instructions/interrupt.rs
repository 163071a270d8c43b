//! The single-bit flag instructions: `CLC/CMC/STC/CLD/STD/CLI/STI`.
//! `INT`/`INTO`/`IRET` live in [`super::control_flow`] alongside the
//! other transfer-of-control instructions they share their push/pop
//! shape with.

use crate::cpu::Cpu;
use crate::decode::Instruction;
use crate::error::Result;
use crate::register::flag;

pub fn clc(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set_flag(flag::CF, false);
    Ok(())
}

pub fn cmc(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    let cf = cpu.regs.flag(flag::CF);
    cpu.regs.set_flag(flag::CF, !cf);
    Ok(())
}

pub fn stc(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set_flag(flag::CF, true);
    Ok(())
}

pub fn cld(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set_flag(flag::DF, false);
    Ok(())
}

pub fn std(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set_flag(flag::DF, true);
    Ok(())
}

pub fn cli(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set_flag(flag::IF, false);
    Ok(())
}

pub fn sti(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    cpu.regs.set_flag(flag::IF, true);
    Ok(())
}
