//! Sequentially consumes bytes/words from the code stream at CS:IP,
//! advancing IP. IP wraps modulo 2^16; the segment never changes on
//! wrap.

use crate::bus::{linear, Bus};
use crate::error::Result;
use crate::register::{Reg16, RegisterFile};

pub struct Fetcher<'a> {
    regs: &'a mut RegisterFile,
    bus: &'a Bus,
}

impl<'a> Fetcher<'a> {
    pub fn new(regs: &'a mut RegisterFile, bus: &'a Bus) -> Self {
        Fetcher { regs, bus }
    }

    pub fn fetch_u8(&mut self) -> Result<u8> {
        let cs = self.regs.get16(Reg16::Cs);
        let ip = self.regs.get16(Reg16::Ip);
        let value = self.bus.read_u8(linear(cs, ip))?;
        self.regs.set16(Reg16::Ip, ip.wrapping_add(1));
        Ok(value)
    }

    pub fn fetch_u16(&mut self) -> Result<u16> {
        let cs = self.regs.get16(Reg16::Cs);
        let ip = self.regs.get16(Reg16::Ip);
        let value = self.bus.read_u16(linear(cs, ip))?;
        self.regs.set16(Reg16::Ip, ip.wrapping_add(2));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;

    fn bios() -> Vec<u8> {
        vec![0u8; crate::bus::BIOS_SIZE]
    }

    #[test]
    fn fetch_u8_advances_ip_by_one() {
        let mut bus = Bus::new(&bios(), 0x100000).unwrap();
        let mut regs = RegisterFile::new();
        regs.set16(Reg16::Cs, 0);
        regs.set16(Reg16::Ip, 0x100);
        bus.write_u8(0x100, 0xAB).unwrap();
        let mut fetcher = Fetcher::new(&mut regs, &bus);
        assert_eq!(fetcher.fetch_u8().unwrap(), 0xAB);
        assert_eq!(regs.get16(Reg16::Ip), 0x101);
    }

    #[test]
    fn fetch_u16_advances_ip_by_two_and_wraps() {
        let mut bus = Bus::new(&bios(), 0x100000).unwrap();
        let mut regs = RegisterFile::new();
        regs.set16(Reg16::Cs, 0);
        regs.set16(Reg16::Ip, 0xFFFF);
        bus.write_u8(0xFFFF, 0x34).unwrap();
        bus.write_u8(0x10000, 0x12).unwrap();
        let mut fetcher = Fetcher::new(&mut regs, &bus);
        assert_eq!(fetcher.fetch_u16().unwrap(), 0x1234);
        // IP wraps modulo 2^16, segment unchanged
        assert_eq!(regs.get16(Reg16::Ip), 1);
        assert_eq!(regs.get16(Reg16::Cs), 0);
    }
}
