//! The BIOS data area: a 256-byte block at linear `0x400` (segment
//! `0x40`) that DOS-era code reads to decide the BIOS is sane before
//! trusting it. Field offsets follow the standard IBM PC BDA layout.

pub const BDA_BASE: u32 = 0x400;

pub const EQUIPMENT_WORD: u32 = 0x10;
pub const BASE_MEMORY_KIB: u32 = 0x13;
pub const KEYBOARD_FLAGS: u32 = 0x17;
pub const VIDEO_MODE: u32 = 0x49;
pub const VIDEO_COLUMNS: u32 = 0x4A;
pub const ACTIVE_DISPLAY_PORT: u32 = 0x63;
pub const HARD_DISK_COUNT: u32 = 0x75;
