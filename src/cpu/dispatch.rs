//! Routes a decoded [`Instruction`] to its handler in `instructions::*`.
//! The only control-flow logic that lives here rather than in a handler
//! is `HLT`, since halting is CPU-loop state rather than an
//! instruction's own side effect.

use super::Cpu;
use crate::decode::{Instruction, InstructionKind};
use crate::error::Result;
use crate::instructions::{arith, bcd, control_flow, data_transfer, interrupt, io, logic, muldiv, shift_rotate, string_ops, trap};
use crate::register::Reg16;

pub(super) fn execute(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    use InstructionKind::*;
    match instr.kind {
        Invalid => Err(crate::error::Error::InvalidInstruction {
            cs: cpu.regs.get16(Reg16::Cs),
            ip: cpu.regs.get16(Reg16::Ip),
            opcode: 0,
        }),
        Nop => Ok(()),

        Mov => data_transfer::mov(cpu, instr),
        Xchg => data_transfer::xchg(cpu, instr),
        Push => data_transfer::push(cpu, instr),
        Pop => data_transfer::pop(cpu, instr),
        Pushf => data_transfer::pushf(cpu, instr),
        Popf => data_transfer::popf(cpu, instr),
        Lea => data_transfer::lea(cpu, instr),
        Lds => data_transfer::lds(cpu, instr),
        Les => data_transfer::les(cpu, instr),
        Xlat => data_transfer::xlat(cpu, instr),
        In => io::in_(cpu, instr),
        Out => io::out(cpu, instr),
        Lahf => data_transfer::lahf(cpu, instr),
        Sahf => data_transfer::sahf(cpu, instr),
        Cbw => data_transfer::cbw(cpu, instr),
        Cwd => data_transfer::cwd(cpu, instr),

        Add => arith::add(cpu, instr),
        Adc => arith::adc(cpu, instr),
        Sub => arith::sub(cpu, instr),
        Sbb => arith::sbb(cpu, instr),
        Cmp => arith::cmp(cpu, instr),
        Inc => arith::inc(cpu, instr),
        Dec => arith::dec(cpu, instr),
        Neg => arith::neg(cpu, instr),
        Mul => muldiv::mul(cpu, instr),
        Imul => muldiv::imul(cpu, instr),
        Div => muldiv::div(cpu, instr),
        Idiv => muldiv::idiv(cpu, instr),
        Aaa => bcd::aaa(cpu, instr),
        Aas => bcd::aas(cpu, instr),
        Aam => bcd::aam(cpu, instr),
        Aad => bcd::aad(cpu, instr),
        Daa => bcd::daa(cpu, instr),
        Das => bcd::das(cpu, instr),

        And => logic::and(cpu, instr),
        Or => logic::or(cpu, instr),
        Xor => logic::xor(cpu, instr),
        Test => logic::test(cpu, instr),
        Not => logic::not(cpu, instr),
        Shl | Shr | Sar | Rol | Ror | Rcl | Rcr => shift_rotate::execute(cpu, instr),

        JmpNearRel => control_flow::jmp_near_rel(cpu, instr),
        JmpNearAbs => control_flow::jmp_near_abs(cpu, instr),
        JmpFar => control_flow::jmp_far(cpu, instr),
        Jcc(cond) => control_flow::jcc(cpu, instr, cond),
        Loop => control_flow::loop_(cpu, instr),
        Loopz => control_flow::loopz(cpu, instr),
        Loopnz => control_flow::loopnz(cpu, instr),
        Jcxz => control_flow::jcxz(cpu, instr),
        CallNearRel => control_flow::call_near_rel(cpu, instr),
        CallNearAbs => control_flow::call_near_abs(cpu, instr),
        CallFar => control_flow::call_far(cpu, instr),
        RetNear => control_flow::ret_near(cpu, instr),
        RetFar => control_flow::ret_far(cpu, instr),
        Int => control_flow::int_(cpu, instr),
        Into => control_flow::into(cpu, instr),
        Iret => control_flow::iret(cpu, instr),

        Movs => string_ops::movs(cpu, instr),
        Cmps => string_ops::cmps(cpu, instr),
        Scas => string_ops::scas(cpu, instr),
        Lods => string_ops::lods(cpu, instr),
        Stos => string_ops::stos(cpu, instr),

        Clc => interrupt::clc(cpu, instr),
        Cmc => interrupt::cmc(cpu, instr),
        Stc => interrupt::stc(cpu, instr),
        Cld => interrupt::cld(cpu, instr),
        Std => interrupt::std(cpu, instr),
        Cli => interrupt::cli(cpu, instr),
        Sti => interrupt::sti(cpu, instr),

        Hlt => {
            let ip = cpu.regs.get16(Reg16::Ip).wrapping_sub(1);
            cpu.regs.set16(Reg16::Ip, ip);
            cpu.halted = true;
            Ok(())
        }
        Wait => Err(crate::error::Error::Unsupported { what: "WAIT" }),

        EmulatorTrap => trap::emulator_trap(cpu, instr),
    }
}
