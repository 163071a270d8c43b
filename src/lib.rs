//! Real-mode 8086-class CPU emulator core: decoder, dispatcher,
//! ALU/flags and the paged bus. See `Cpu` for the entry point.

mod alu;
mod bios;
mod bus;
mod cpu;
mod decode;
mod device;
mod drive;
mod error;
mod fetch;
mod instructions;
mod operand;
mod register;

pub use bus::{linear, BIOS_BASE, BIOS_SIZE, PAGE_SIZE};
pub use cpu::{BatchResult, Cpu, CpuConfig, StepResult};
pub use decode::{Condition, InstructionKind, SegReg};
pub use device::{Device, DriveOps, IoMappedDevice, MemoryMappedDevice, PageRange};
pub use drive::{ImdDrive, RawDrive};
pub use error::{Error, Result};
pub use register::{flag, Reg16, Reg8};
