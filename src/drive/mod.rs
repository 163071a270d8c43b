pub mod imd;
pub mod raw;

pub use imd::ImdDrive;
pub use raw::RawDrive;
