//! Owns the register file and bus, and drives the fetch/decode/dispatch
//! loop. This is the crate's public entry point.

mod dispatch;

use tracing::{debug, info};

use crate::bus::Bus;
use crate::decode::decode;
use crate::device::Device;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::register::{Reg16, Reg8, RegisterFile};

/// Passed to [`Cpu::with_config`]; [`Cpu::new`] uses the defaults.
#[derive(Debug, Clone)]
pub struct CpuConfig {
    pub memory_size: usize,
    /// Mirrors the `tracing` subscriber's filter; hosts that don't
    /// install a subscriber can leave this off without cost.
    pub trace: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            memory_size: 0x100000,
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Running,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchResult {
    Completed,
    Halted,
}

pub struct Cpu {
    pub(crate) regs: RegisterFile,
    pub(crate) bus: Bus,
    pub(crate) halted: bool,
    trace: bool,
}

impl Cpu {
    /// RAM `0xCC`-sentinel filled, BIOS mapped at `0xF0000`, reset
    /// vector `CS:IP = 0xF000:0xFFF0`.
    pub fn new(bios_bytes: &[u8], memory_size: usize) -> Result<Self> {
        Self::with_config(bios_bytes, CpuConfig { memory_size, ..Default::default() })
    }

    pub fn with_config(bios_bytes: &[u8], config: CpuConfig) -> Result<Self> {
        let bus = Bus::new(bios_bytes, config.memory_size)?;
        info!(memory_size = config.memory_size, "cpu reset");
        Ok(Cpu {
            regs: RegisterFile::new(),
            bus,
            halted: false,
            trace: config.trace,
        })
    }

    pub fn attach_device(&mut self, device: Device) -> Result<()> {
        info!("attaching device");
        self.bus.attach(device)
    }

    pub fn get_register(&self, r: Reg16) -> u16 {
        self.regs.get16(r)
    }

    pub fn set_register(&mut self, r: Reg16, v: u16) {
        self.regs.set16(r, v)
    }

    pub fn get_register8(&self, r: Reg8) -> u8 {
        self.regs.get8(r)
    }

    pub fn set_register8(&mut self, r: Reg8, v: u8) {
        self.regs.set8(r, v)
    }

    pub fn flags(&self) -> u16 {
        self.regs.flags()
    }

    pub fn set_flags(&mut self, v: u16) {
        self.regs.set_flags(v)
    }

    pub fn read_bytes(&self, addr: u32, size: usize) -> Result<Vec<u8>> {
        self.bus.read_bytes(addr, size)
    }

    pub fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> Result<()> {
        self.bus.write_bytes(addr, bytes)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Pushes `FLAGS`, `CS`, `IP`, clears `IF`/`TF`, and loads `CS:IP`
    /// from the vector at `4*vector`. Used both for `INT`/`INTO` and
    /// internally for the divide-error trap (interrupt `0`).
    pub(crate) fn raise_interrupt(&mut self, vector: u8) -> Result<()> {
        let flags = self.regs.flags();
        self.push16(flags)?;
        let cs = self.regs.get16(Reg16::Cs);
        self.push16(cs)?;
        let ip = self.regs.get16(Reg16::Ip);
        self.push16(ip)?;
        self.regs.set_flag(crate::register::flag::IF, false);
        self.regs.set_flag(crate::register::flag::TF, false);
        let table_base = 4 * vector as u32;
        let new_ip = self.bus.read_u16(table_base)?;
        let new_cs = self.bus.read_u16(table_base + 2)?;
        self.regs.set16(Reg16::Ip, new_ip);
        self.regs.set16(Reg16::Cs, new_cs);
        Ok(())
    }

    /// `SP -= 2; mem[SS:SP] = v`. `SP` is modified before the store, so
    /// `PUSH SP` observes the already-decremented value (the 8086 bug).
    pub(crate) fn push16(&mut self, v: u16) -> Result<()> {
        let sp = self.regs.get16(Reg16::Sp).wrapping_sub(2);
        self.regs.set16(Reg16::Sp, sp);
        let ss = self.regs.get16(Reg16::Ss);
        self.bus.write_u16(crate::bus::linear(ss, sp), v)
    }

    pub(crate) fn pop16(&mut self) -> Result<u16> {
        let sp = self.regs.get16(Reg16::Sp);
        let ss = self.regs.get16(Reg16::Ss);
        let v = self.bus.read_u16(crate::bus::linear(ss, sp))?;
        self.regs.set16(Reg16::Sp, sp.wrapping_add(2));
        Ok(v)
    }

    pub fn process_single_instruction(&mut self) -> Result<StepResult> {
        if self.halted {
            return Ok(StepResult::Halted);
        }
        let instr = {
            let mut fetcher = Fetcher::new(&mut self.regs, &self.bus);
            decode(&mut fetcher)?
        };
        if self.trace {
            debug!(kind = ?instr.kind, "dispatch");
        }
        dispatch::execute(self, &instr)?;
        Ok(if self.halted { StepResult::Halted } else { StepResult::Running })
    }

    pub fn process_instructions(&mut self, n: usize) -> Result<BatchResult> {
        for _ in 0..n {
            if self.process_single_instruction()? == StepResult::Halted {
                return Ok(BatchResult::Halted);
            }
        }
        Ok(BatchResult::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bios() -> Vec<u8> {
        vec![0u8; crate::bus::BIOS_SIZE]
    }

    #[test]
    fn reset_vector_is_f000_fff0() {
        let cpu = Cpu::new(&bios(), 0x100000).unwrap();
        assert_eq!(cpu.get_register(Reg16::Cs), 0xF000);
        assert_eq!(cpu.get_register(Reg16::Ip), 0xFFF0);
    }

    #[test]
    fn push16_pop16_round_trip() {
        let mut cpu = Cpu::new(&bios(), 0x100000).unwrap();
        cpu.set_register(Reg16::Ss, 0);
        cpu.set_register(Reg16::Sp, 0x1000);
        cpu.push16(0xBEEF).unwrap();
        assert_eq!(cpu.get_register(Reg16::Sp), 0x0FFE);
        assert_eq!(cpu.pop16().unwrap(), 0xBEEF);
        assert_eq!(cpu.get_register(Reg16::Sp), 0x1000);
    }

    #[test]
    fn hlt_halts_and_process_instructions_reports_it() {
        let mut cpu = Cpu::new(&bios(), 0x100000).unwrap();
        cpu.set_register(Reg16::Cs, 0);
        cpu.set_register(Reg16::Ip, 0x100);
        cpu.write_bytes(0x100, &[0xF4]).unwrap(); // HLT
        let result = cpu.process_instructions(10).unwrap();
        assert_eq!(result, BatchResult::Halted);
        assert!(cpu.is_halted());
    }
}
