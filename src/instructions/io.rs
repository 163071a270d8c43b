//! `IN`/`OUT`: port access through `AL`/`AX`, the port number coming
//! either from an immediate byte or from `DX`.

use super::width_of;
use crate::alu::Width;
use crate::cpu::Cpu;
use crate::decode::{Instruction, Operand};
use crate::error::Result;
use crate::register::{Reg16, Reg8};

fn port_number(cpu: &Cpu, operand: Operand) -> u16 {
    match operand {
        Operand::Constant(v) => v as u16,
        Operand::Register16(Reg16::Dx) => cpu.get_register(Reg16::Dx),
        _ => unreachable!("port operand is always an immediate byte or DX"),
    }
}

pub fn in_(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let port = port_number(cpu, instr.arg2);
    if width_of(instr) == Width::Byte {
        let v = cpu.bus.read_port(port)?;
        cpu.regs.set8(Reg8::Al, v);
    } else {
        let lo = cpu.bus.read_port(port)?;
        let hi = cpu.bus.read_port(port.wrapping_add(1))?;
        cpu.regs.set16(Reg16::Ax, u16::from_le_bytes([lo, hi]));
    }
    Ok(())
}

pub fn out(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let port = port_number(cpu, instr.arg1);
    if width_of(instr) == Width::Byte {
        cpu.bus.write_port(port, cpu.regs.get8(Reg8::Al))
    } else {
        let [lo, hi] = cpu.regs.get16(Reg16::Ax).to_le_bytes();
        cpu.bus.write_port(port, lo)?;
        cpu.bus.write_port(port.wrapping_add(1), hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::InstrFlags;
    use crate::device::{Device, IoMappedDevice};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Loopback(u8);
    impl IoMappedDevice for Loopback {
        fn read_u8(&mut self, _port: u16) -> u8 {
            self.0
        }
        fn write_u8(&mut self, _port: u16, value: u8) {
            self.0 = value;
        }
    }

    fn cpu() -> Cpu {
        Cpu::new(&vec![0u8; crate::bus::BIOS_SIZE], 0x100000).unwrap()
    }

    #[test]
    fn out_then_in_round_trips_through_port() {
        let mut c = cpu();
        let dev = Rc::new(RefCell::new(Loopback(0)));
        c.attach_device(Device::IoMapped { device: dev, ports: vec![0x60] }).unwrap();
        c.set_register8(Reg8::Al, 0x42);
        let instr = Instruction {
            kind: crate::decode::InstructionKind::Out,
            flags: InstrFlags::SIZE8,
            segment_override: None,
            opcode_prefix: 0,
            arg1: Operand::Constant(0x60),
            arg2: Operand::None,
        };
        out(&mut c, &instr).unwrap();
        c.set_register8(Reg8::Al, 0);
        let in_instr = Instruction { arg2: Operand::Constant(0x60), ..instr };
        in_(&mut c, &in_instr).unwrap();
        assert_eq!(c.get_register8(Reg8::Al), 0x42);
    }
}
