//! Error kinds: all bubble to the step caller, none are caught by
//! inner layers. A divide error is raised internally as software
//! interrupt 0 and never reaches the host as an `Err`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("BIOS image is {got:#x} bytes, expected exactly {expected:#x}")]
    InvalidBios { got: usize, expected: usize },

    #[error("invalid instruction encoding at CS:IP={cs:#06x}:{ip:#06x} (opcode {opcode:#04x})")]
    InvalidInstruction { cs: u16, ip: u16, opcode: u8 },

    #[error("bus access to unmapped physical address {addr:#07x}")]
    UnmappedBusAccess { addr: u32 },

    #[error("I/O access to unbound port {port:#06x}")]
    UnboundPort { port: u16 },

    #[error("no free drive slot for {kind}")]
    DeviceFull { kind: &'static str },

    #[error("decoded instruction is not supported by this implementation: {what}")]
    Unsupported { what: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
