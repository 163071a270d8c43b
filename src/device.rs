//! Device sum type. The source this crate is modeled on used inheritance
//! and runtime introspection to ask an object "are you a drive? a
//! memory-mapped device? an I/O-mapped device?" — here that's a closed
//! enum the attach code matches on instead.

use std::cell::RefCell;
use std::rc::Rc;

/// A disk-like device the emulator trap's disk-read function reads
/// through. Always reports its geometry; the trap computes the linear
/// byte offset from CHS parameters using these, it never infers
/// geometry from file size.
pub trait DriveOps {
    fn heads(&self) -> u32;
    fn sectors_per_track(&self) -> u32;
    fn cylinders(&self) -> u32;
    fn sector_size(&self) -> u32;
    fn is_floppy(&self) -> bool;
    fn read(&self, byte_offset: u64, byte_size: usize) -> Vec<u8>;
}

/// A device that owns one or more page-aligned ranges of the 1 MiB
/// address space.
pub trait MemoryMappedDevice {
    fn read_u8(&mut self, addr: u32) -> u8;
    fn write_u8(&mut self, addr: u32, value: u8);
}

/// A device that owns a set of I/O ports.
pub trait IoMappedDevice {
    fn read_u8(&mut self, port: u16) -> u8;
    fn write_u8(&mut self, port: u16, value: u8);
}

/// (start_page, page_count); both must describe a page-aligned range.
pub type PageRange = (u32, u32);

pub enum Device {
    Drive(Box<dyn DriveOps>),
    MemMapped {
        device: Rc<RefCell<dyn MemoryMappedDevice>>,
        ranges: Vec<PageRange>,
    },
    IoMapped {
        device: Rc<RefCell<dyn IoMappedDevice>>,
        ports: Vec<u16>,
    },
}
