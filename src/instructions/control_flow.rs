//! Near/far call and return, conditional and unconditional jumps,
//! `LOOP`/`LOOPZ`/`LOOPNZ`/`JCXZ`, and software interrupts (`INT`,
//! `INTO`, `IRET`).

use crate::cpu::Cpu;
use crate::decode::{Condition, Instruction, Operand};
use crate::error::Result;
use crate::operand::{effective_address, read16};
use crate::register::{flag, Reg16};

fn predicate(cond: Condition, flags: u16) -> bool {
    let f = |m: u16| flags & m != 0;
    match cond {
        Condition::O => f(flag::OF),
        Condition::No => !f(flag::OF),
        Condition::B => f(flag::CF),
        Condition::Nb => !f(flag::CF),
        Condition::E => f(flag::ZF),
        Condition::Ne => !f(flag::ZF),
        Condition::Be => f(flag::CF) || f(flag::ZF),
        Condition::A => !f(flag::CF) && !f(flag::ZF),
        Condition::S => f(flag::SF),
        Condition::Ns => !f(flag::SF),
        Condition::P => f(flag::PF),
        Condition::Np => !f(flag::PF),
        Condition::L => f(flag::SF) != f(flag::OF),
        Condition::Ge => f(flag::SF) == f(flag::OF),
        Condition::Le => f(flag::ZF) || (f(flag::SF) != f(flag::OF)),
        Condition::G => !f(flag::ZF) && (f(flag::SF) == f(flag::OF)),
    }
}

fn relative_disp(arg: Operand) -> i32 {
    match arg {
        Operand::Constant(v) => v,
        _ => unreachable!("jump/call displacement is always decoded as a constant"),
    }
}

fn far_target(cpu: &Cpu, instr: &Instruction) -> Result<(u16, u16)> {
    Ok(match instr.arg1 {
        Operand::FarPointer { segment, offset } => (segment, offset),
        other => {
            let addr = effective_address(&cpu.regs, other, instr.segment_override)
                .expect("indirect far call/jump operand is always memory-shaped");
            let offset = cpu.bus.read_u16(addr)?;
            let segment = cpu.bus.read_u16(addr.wrapping_add(2))?;
            (segment, offset)
        }
    })
}

pub fn jmp_near_rel(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let disp = relative_disp(instr.arg1);
    let ip = cpu.regs.get16(Reg16::Ip);
    cpu.regs.set16(Reg16::Ip, ip.wrapping_add(disp as u16));
    Ok(())
}

pub fn jmp_near_abs(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let target = read16(&cpu.regs, &cpu.bus, instr.arg1, instr.segment_override)?;
    cpu.regs.set16(Reg16::Ip, target);
    Ok(())
}

pub fn jmp_far(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let (segment, offset) = far_target(cpu, instr)?;
    cpu.regs.set16(Reg16::Cs, segment);
    cpu.regs.set16(Reg16::Ip, offset);
    Ok(())
}

pub fn jcc(cpu: &mut Cpu, instr: &Instruction, cond: Condition) -> Result<()> {
    if predicate(cond, cpu.regs.flags()) {
        jmp_near_rel(cpu, instr)?;
    }
    Ok(())
}

pub fn loop_(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let cx = cpu.regs.get16(Reg16::Cx).wrapping_sub(1);
    cpu.regs.set16(Reg16::Cx, cx);
    if cx != 0 {
        jmp_near_rel(cpu, instr)?;
    }
    Ok(())
}

pub fn loopz(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let cx = cpu.regs.get16(Reg16::Cx).wrapping_sub(1);
    cpu.regs.set16(Reg16::Cx, cx);
    if cx != 0 && cpu.regs.flag(flag::ZF) {
        jmp_near_rel(cpu, instr)?;
    }
    Ok(())
}

pub fn loopnz(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let cx = cpu.regs.get16(Reg16::Cx).wrapping_sub(1);
    cpu.regs.set16(Reg16::Cx, cx);
    if cx != 0 && !cpu.regs.flag(flag::ZF) {
        jmp_near_rel(cpu, instr)?;
    }
    Ok(())
}

pub fn jcxz(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    if cpu.regs.get16(Reg16::Cx) == 0 {
        jmp_near_rel(cpu, instr)?;
    }
    Ok(())
}

pub fn call_near_rel(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let ip = cpu.regs.get16(Reg16::Ip);
    cpu.push16(ip)?;
    jmp_near_rel(cpu, instr)
}

pub fn call_near_abs(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let target = read16(&cpu.regs, &cpu.bus, instr.arg1, instr.segment_override)?;
    let ip = cpu.regs.get16(Reg16::Ip);
    cpu.push16(ip)?;
    cpu.regs.set16(Reg16::Ip, target);
    Ok(())
}

pub fn call_far(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let (segment, offset) = far_target(cpu, instr)?;
    let cs = cpu.regs.get16(Reg16::Cs);
    cpu.push16(cs)?;
    let ip = cpu.regs.get16(Reg16::Ip);
    cpu.push16(ip)?;
    cpu.regs.set16(Reg16::Cs, segment);
    cpu.regs.set16(Reg16::Ip, offset);
    Ok(())
}

fn sp_adjustment(instr: &Instruction) -> u16 {
    match instr.arg1 {
        Operand::Constant(v) => v as u16,
        _ => 0,
    }
}

pub fn ret_near(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let ip = cpu.pop16()?;
    cpu.regs.set16(Reg16::Ip, ip);
    let adj = sp_adjustment(instr);
    if adj != 0 {
        let sp = cpu.regs.get16(Reg16::Sp).wrapping_add(adj);
        cpu.regs.set16(Reg16::Sp, sp);
    }
    Ok(())
}

pub fn ret_far(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let ip = cpu.pop16()?;
    let cs = cpu.pop16()?;
    cpu.regs.set16(Reg16::Ip, ip);
    cpu.regs.set16(Reg16::Cs, cs);
    let adj = sp_adjustment(instr);
    if adj != 0 {
        let sp = cpu.regs.get16(Reg16::Sp).wrapping_add(adj);
        cpu.regs.set16(Reg16::Sp, sp);
    }
    Ok(())
}

pub fn int_(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let vector = match instr.arg1 {
        Operand::Constant(v) => v as u8,
        _ => unreachable!("INT's operand is always decoded as a constant"),
    };
    cpu.raise_interrupt(vector)
}

pub fn into(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    if cpu.regs.flag(flag::OF) {
        cpu.raise_interrupt(4)?;
    }
    Ok(())
}

pub fn iret(cpu: &mut Cpu, _instr: &Instruction) -> Result<()> {
    let ip = cpu.pop16()?;
    let cs = cpu.pop16()?;
    let flags = cpu.pop16()?;
    cpu.regs.set16(Reg16::Ip, ip);
    cpu.regs.set16(Reg16::Cs, cs);
    cpu.regs.set_flags(flags);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{InstrFlags, InstructionKind};

    fn cpu() -> Cpu {
        Cpu::new(&vec![0u8; crate::bus::BIOS_SIZE], 0x100000).unwrap()
    }

    fn jump_instr(kind: InstructionKind, disp: i32) -> Instruction {
        Instruction {
            kind,
            flags: InstrFlags::empty(),
            segment_override: None,
            opcode_prefix: 0,
            arg1: Operand::Constant(disp),
            arg2: Operand::None,
        }
    }

    #[test]
    fn jcc_taken_adds_displacement() {
        let mut c = cpu();
        c.regs.set_flag(flag::ZF, true);
        c.set_register(Reg16::Ip, 0x200);
        jcc(&mut c, &jump_instr(InstructionKind::Jcc(Condition::E), 5), Condition::E).unwrap();
        assert_eq!(c.get_register(Reg16::Ip), 0x205);
    }

    #[test]
    fn jcc_not_taken_leaves_ip() {
        let mut c = cpu();
        c.set_register(Reg16::Ip, 0x200);
        jcc(&mut c, &jump_instr(InstructionKind::Jcc(Condition::E), 5), Condition::E).unwrap();
        assert_eq!(c.get_register(Reg16::Ip), 0x200);
    }

    #[test]
    fn loop_decrements_and_jumps_while_nonzero() {
        let mut c = cpu();
        c.set_register(Reg16::Cx, 1);
        c.set_register(Reg16::Ip, 0x200);
        loop_(&mut c, &jump_instr(InstructionKind::Loop, -2)).unwrap();
        assert_eq!(c.get_register(Reg16::Cx), 0);
        assert_eq!(c.get_register(Reg16::Ip), 0x200); // CX hit zero, no jump
    }

    #[test]
    fn call_near_rel_pushes_return_address() {
        let mut c = cpu();
        c.set_register(Reg16::Ss, 0);
        c.set_register(Reg16::Sp, 0x100);
        c.set_register(Reg16::Ip, 0x50);
        call_near_rel(&mut c, &jump_instr(InstructionKind::CallNearRel, 0x10)).unwrap();
        assert_eq!(c.get_register(Reg16::Ip), 0x60);
        assert_eq!(c.pop16().unwrap(), 0x50);
    }

    #[test]
    fn int_and_iret_round_trip() {
        let mut c = cpu();
        c.set_register(Reg16::Ss, 0);
        c.set_register(Reg16::Sp, 0x200);
        c.set_register(Reg16::Cs, 0x1000);
        c.set_register(Reg16::Ip, 0x20);
        // vector 1 -> offset at linear 4, segment at linear 6
        c.write_bytes(4, &[0x34, 0x12, 0x00, 0x20]).unwrap();
        int_(&mut c, &jump_instr(InstructionKind::Int, 1)).unwrap();
        assert_eq!(c.get_register(Reg16::Ip), 0x1234);
        assert_eq!(c.get_register(Reg16::Cs), 0x2000);
        iret(&mut c, &jump_instr(InstructionKind::Iret, 0)).unwrap();
        assert_eq!(c.get_register(Reg16::Ip), 0x20);
        assert_eq!(c.get_register(Reg16::Cs), 0x1000);
    }
}
