//! `SHL/SHR/SAR/ROL/ROR/RCL/RCR`: the count comes from the group's
//! second argument (`1`, `CL`, or an immediate byte).

use super::width_of;
use crate::alu::{self, Width};
use crate::cpu::Cpu;
use crate::decode::{Instruction, InstructionKind};
use crate::error::Result;
use crate::operand::{read16, read8, read_count, write16, write8};

pub fn execute(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let width = width_of(instr);
    let over = instr.segment_override;
    let count = read_count(&cpu.regs, instr.arg2)?;
    let op = match instr.kind {
        InstructionKind::Shl => alu::shl,
        InstructionKind::Shr => alu::shr,
        InstructionKind::Sar => alu::sar,
        InstructionKind::Rol => alu::rol,
        InstructionKind::Ror => alu::ror,
        InstructionKind::Rcl => alu::rcl,
        InstructionKind::Rcr => alu::rcr,
        _ => unreachable!("execute() is only called for shift/rotate kinds"),
    };

    if width == Width::Byte {
        let a = read8(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = op(&mut cpu.regs, a, count, width);
        write8(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u8)
    } else {
        let a = read16(&cpu.regs, &cpu.bus, instr.arg1, over)? as u32;
        let r = op(&mut cpu.regs, a, count, width);
        write16(&mut cpu.regs, &mut cpu.bus, instr.arg1, over, r as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{InstrFlags, Operand};
    use crate::register::Reg16;

    fn cpu() -> Cpu {
        Cpu::new(&vec![0u8; crate::bus::BIOS_SIZE], 0x100000).unwrap()
    }

    #[test]
    fn shl_0xc000_by_one() {
        let mut c = cpu();
        c.set_register(Reg16::Ax, 0xC000);
        let i = Instruction {
            kind: InstructionKind::Shl,
            flags: InstrFlags::empty(),
            segment_override: None,
            opcode_prefix: 0,
            arg1: Operand::Register16(Reg16::Ax),
            arg2: Operand::Constant(1),
        };
        execute(&mut c, &i).unwrap();
        assert_eq!(c.get_register(Reg16::Ax), 0x8000);
        assert!(c.regs.flag(crate::register::flag::CF));
        assert!(!c.regs.flag(crate::register::flag::OF));
    }
}
