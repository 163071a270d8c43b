//! A flat, sector-major disk image: `read(offset, size)` is a plain
//! slice of the backing bytes. CHS geometry is supplied at
//! construction rather than inferred from the image size.

use crate::device::DriveOps;

pub struct RawDrive {
    data: Vec<u8>,
    heads: u32,
    sectors_per_track: u32,
    cylinders: u32,
    sector_size: u32,
    floppy: bool,
}

impl RawDrive {
    pub fn new(
        data: Vec<u8>,
        heads: u32,
        sectors_per_track: u32,
        cylinders: u32,
        sector_size: u32,
        floppy: bool,
    ) -> Self {
        RawDrive {
            data,
            heads,
            sectors_per_track,
            cylinders,
            sector_size,
            floppy,
        }
    }

    /// A 1.44 MiB 3.5" floppy: 2 heads, 18 sectors/track, 80 cylinders,
    /// 512-byte sectors.
    pub fn floppy_1440k(data: Vec<u8>) -> Self {
        Self::new(data, 2, 18, 80, 512, true)
    }
}

impl DriveOps for RawDrive {
    fn heads(&self) -> u32 {
        self.heads
    }

    fn sectors_per_track(&self) -> u32 {
        self.sectors_per_track
    }

    fn cylinders(&self) -> u32 {
        self.cylinders
    }

    fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn is_floppy(&self) -> bool {
        self.floppy
    }

    fn read(&self, byte_offset: u64, byte_size: usize) -> Vec<u8> {
        let start = byte_offset as usize;
        let end = (start + byte_size).min(self.data.len());
        if start >= self.data.len() {
            return vec![0u8; byte_size];
        }
        let mut out = self.data[start..end].to_vec();
        out.resize(byte_size, 0);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_a_flat_slice() {
        let mut data = vec![0u8; 4096];
        data[512..516].copy_from_slice(&[1, 2, 3, 4]);
        let drive = RawDrive::floppy_1440k(data);
        assert_eq!(drive.read(512, 4), vec![1, 2, 3, 4]);
        assert_eq!(drive.heads(), 2);
        assert_eq!(drive.sectors_per_track(), 18);
        assert_eq!(drive.cylinders(), 80);
        assert_eq!(drive.sector_size(), 512);
        assert!(drive.is_floppy());
    }

    #[test]
    fn reads_past_end_are_zero_padded() {
        let drive = RawDrive::floppy_1440k(vec![0xAAu8; 16]);
        let out = drive.read(10, 16);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[0..6], &[0xAA; 6]);
        assert_eq!(&out[6..], &[0u8; 10]);
    }
}
