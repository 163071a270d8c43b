//! ImageDisk (`.imd`) reader.
//!
//! Layout: an ASCII header beginning `"IMD"`, terminated by `\r\n`, then
//! a free-form comment terminated by `0x1A`, then one record per track:
//! `mode, cylinder, head, sector_count, sector_size_code`, a sector
//! numbering map (`sector_count` bytes), then `sector_count` typed
//! sector payloads. Only the two payload types this spec names are
//! handled with real data; anything else degrades to a zero-filled
//! sector rather than erroring, since an unreadable sector on a real
//! drive still occupies space in the logical image.

use crate::device::DriveOps;

const SECTOR_UNAVAILABLE: u8 = 0x00;
const NORMAL_DATA: u8 = 0x01;
const COMPRESSED: u8 = 0x02;
const NORMAL_DATA_DELETED: u8 = 0x03;
const COMPRESSED_DELETED: u8 = 0x04;

fn sector_size_for_code(code: u8) -> usize {
    128usize << code
}

struct Track {
    sectors: Vec<Vec<u8>>,
}

pub struct ImdDrive {
    data: Vec<u8>,
    heads: u32,
    sectors_per_track: u32,
    cylinders: u32,
    sector_size: u32,
}

impl ImdDrive {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if !bytes.starts_with(b"IMD") {
            return None;
        }
        let header_end = find(bytes, b"\r\n", 0)?;
        let comment_end = find(bytes, &[0x1A], header_end)?;
        let mut cursor = comment_end + 1;

        let mut tracks: Vec<(u8, u8, u8, Track)> = Vec::new();
        let mut sector_size = 512u32;
        let mut max_head = 0u32;
        let mut max_cyl = 0u32;
        let mut sectors_per_track = 0u32;

        while cursor < bytes.len() {
            let mode = *bytes.get(cursor)?;
            let cylinder = *bytes.get(cursor + 1)?;
            let head_byte = *bytes.get(cursor + 2)?;
            let head = head_byte & 0x3F;
            let sector_count = *bytes.get(cursor + 3)? as usize;
            let size_code = *bytes.get(cursor + 4)?;
            cursor += 5;
            let _ = mode;

            let size = sector_size_for_code(size_code);
            sector_size = size as u32;

            let numbering_map = bytes.get(cursor..cursor + sector_count)?;
            cursor += sector_count;

            let mut sectors = Vec::with_capacity(sector_count);
            for _ in numbering_map {
                let sector_type = *bytes.get(cursor)?;
                cursor += 1;
                let payload = match sector_type {
                    NORMAL_DATA | NORMAL_DATA_DELETED => {
                        let slice = bytes.get(cursor..cursor + size)?;
                        cursor += size;
                        slice.to_vec()
                    }
                    COMPRESSED | COMPRESSED_DELETED => {
                        let fill = *bytes.get(cursor)?;
                        cursor += 1;
                        vec![fill; size]
                    }
                    SECTOR_UNAVAILABLE => vec![0u8; size],
                    _ => vec![0u8; size],
                };
                sectors.push(payload);
            }

            sectors_per_track = sectors_per_track.max(sector_count as u32);
            max_head = max_head.max(head as u32);
            max_cyl = max_cyl.max(cylinder as u32);
            tracks.push((cylinder, head, head_byte, Track { sectors }));
        }

        let heads = max_head + 1;
        let cylinders = max_cyl + 1;

        let mut data = vec![0u8; (heads * cylinders * sectors_per_track * sector_size) as usize];
        for (cylinder, head, _head_byte, track) in &tracks {
            for (i, sector) in track.sectors.iter().enumerate() {
                let lba = (*cylinder as u32 * heads + *head as u32) * sectors_per_track + i as u32;
                let start = (lba * sector_size) as usize;
                let end = start + sector.len().min(sector_size as usize);
                data[start..end].copy_from_slice(&sector[..end - start]);
            }
        }

        Some(ImdDrive {
            data,
            heads,
            sectors_per_track,
            cylinders,
            sector_size,
        })
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

impl DriveOps for ImdDrive {
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
        true
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

    fn single_track_image(sector_count: u8, size_code: u8, payload: &[(u8, &[u8])]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"IMD 1.18: test image\r\n");
        bytes.push(0x1A);
        bytes.push(0x00); // mode
        bytes.push(0x00); // cylinder
        bytes.push(0x00); // head
        bytes.push(sector_count);
        bytes.push(size_code);
        for n in 1..=sector_count {
            bytes.push(n);
        }
        for (sector_type, data) in payload {
            bytes.push(*sector_type);
            bytes.extend_from_slice(data);
        }
        bytes
    }

    #[test]
    fn parses_verbatim_and_compressed_sectors() {
        let sector = vec![0x42u8; 512];
        let image = single_track_image(
            2,
            2,
            &[(NORMAL_DATA, &sector), (COMPRESSED, &[0x7Fu8])],
        );
        let drive = ImdDrive::parse(&image).expect("should parse");
        assert_eq!(drive.sector_size(), 512);
        assert_eq!(drive.heads(), 1);
        assert_eq!(drive.cylinders(), 1);
        assert_eq!(drive.sectors_per_track(), 2);

        let first = drive.read(0, 512);
        assert_eq!(first, sector);
        let second = drive.read(512, 512);
        assert_eq!(second, vec![0x7Fu8; 512]);
    }

    #[test]
    fn rejects_non_imd_data() {
        assert!(ImdDrive::parse(b"not an imd file").is_none());
    }
}
