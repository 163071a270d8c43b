//! ModR/M byte parsing: the `mod`/`reg`/`rm` split and the eight
//! classic base+index addressing combinations, plus the `mod=00,
//! rm=110` direct-address special case.

use crate::decode::Operand;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::register::{Reg16, Reg8};

/// The base+index register pairing selected by the `rm` field, used
/// when `mod != 00 || rm != 0b110`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmKind {
    BxSi,
    BxDi,
    BpSi,
    BpDi,
    Si,
    Di,
    Bp,
    Bx,
}

impl RmKind {
    fn from_rm(rm: u8) -> Self {
        match rm {
            0 => RmKind::BxSi,
            1 => RmKind::BxDi,
            2 => RmKind::BpSi,
            3 => RmKind::BpDi,
            4 => RmKind::Si,
            5 => RmKind::Di,
            6 => RmKind::Bp,
            7 => RmKind::Bx,
            _ => unreachable!("rm field is three bits"),
        }
    }

    /// `true` for the two forms whose default segment is `SS` rather
    /// than `DS` (anything built on `BP`).
    pub fn defaults_to_stack_segment(self) -> bool {
        matches!(self, RmKind::BpSi | RmKind::BpDi | RmKind::Bp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRm {
    pub md: u8,
    pub reg: u8,
    pub rm: u8,
}

impl ModRm {
    pub fn decode(byte: u8) -> Self {
        ModRm {
            md: (byte >> 6) & 0b11,
            reg: (byte >> 3) & 0b111,
            rm: byte & 0b111,
        }
    }

    /// The `reg` field read as a word register.
    pub fn reg16(self) -> Reg16 {
        word_register(self.reg)
    }

    /// The `reg` field read as a byte register.
    pub fn reg8(self) -> Reg8 {
        byte_register(self.reg)
    }

    /// Resolves the `rm` field to an operand, fetching a displacement
    /// from the instruction stream if one is present. `mod == 0b11`
    /// selects a register directly rather than a memory form; callers
    /// that expect a memory-only `rm` (e.g. `LEA`, `LDS`) should reject
    /// that case themselves.
    pub fn rm_operand(self, fetcher: &mut Fetcher, size8: bool) -> Result<Operand> {
        if self.md == 0b11 {
            return Ok(if size8 {
                Operand::Register8(byte_register(self.rm))
            } else {
                Operand::Register16(word_register(self.rm))
            });
        }

        if self.md == 0b00 && self.rm == 0b110 {
            let disp = fetcher.fetch_u16()?;
            return Ok(Operand::Memory(disp));
        }

        let disp: i16 = match self.md {
            0b00 => 0,
            0b01 => fetcher.fetch_u8()? as i8 as i16,
            0b10 => fetcher.fetch_u16()? as i16,
            _ => return Err(Error::Unsupported { what: "modrm.mod" }),
        };
        Ok(Operand::Dereference(RmKind::from_rm(self.rm), disp))
    }
}

pub fn word_register(index: u8) -> Reg16 {
    match index & 0b111 {
        0 => Reg16::Ax,
        1 => Reg16::Cx,
        2 => Reg16::Dx,
        3 => Reg16::Bx,
        4 => Reg16::Sp,
        5 => Reg16::Bp,
        6 => Reg16::Si,
        7 => Reg16::Di,
        _ => unreachable!("masked to three bits"),
    }
}

pub fn byte_register(index: u8) -> Reg8 {
    match index & 0b111 {
        0 => Reg8::Al,
        1 => Reg8::Cl,
        2 => Reg8::Dl,
        3 => Reg8::Bl,
        4 => Reg8::Ah,
        5 => Reg8::Ch,
        6 => Reg8::Dh,
        7 => Reg8::Bh,
        _ => unreachable!("masked to three bits"),
    }
}
