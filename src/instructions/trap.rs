//! The emulator trap, decoded from `0x0F 0x0F <fn>`. Function `0x01`
//! sets up the BIOS data area; function `0x02` reads disk sectors. Both
//! are host-facing escape hatches a real 8086 program could never
//! trigger by accident.

use crate::bios;
use crate::bus::linear;
use crate::cpu::Cpu;
use crate::decode::{Instruction, Operand};
use crate::error::{Error, Result};
use crate::register::Reg16;

/// Parameter words the disk-read trap expects below `BP`, nearest
/// first: `[BP-2]=drive, [BP-4]=head, [BP-6]=cylinder, [BP-8]=sector,
/// [BP-10]=count, [BP-12]=dest_segment, [BP-14]=dest_offset`.
struct DiskReadParams {
    drive: u8,
    head: u32,
    cylinder: u32,
    sector: u32,
    count: u32,
    dest_segment: u16,
    dest_offset: u16,
}

fn read_param(cpu: &Cpu, offset_below_bp: u16) -> Result<u16> {
    let ss = cpu.regs.get16(Reg16::Ss);
    let bp = cpu.regs.get16(Reg16::Bp);
    cpu.bus.read_u16(linear(ss, bp.wrapping_sub(offset_below_bp)))
}

fn disk_read_params(cpu: &Cpu) -> Result<DiskReadParams> {
    Ok(DiskReadParams {
        drive: read_param(cpu, 2)? as u8,
        head: read_param(cpu, 4)? as u32,
        cylinder: read_param(cpu, 6)? as u32,
        sector: read_param(cpu, 8)? as u32,
        count: read_param(cpu, 10)? as u32,
        dest_segment: read_param(cpu, 12)?,
        dest_offset: read_param(cpu, 14)?,
    })
}

/// Function `0x02`: reads `count` sectors starting at CHS
/// `(cylinder, head, sector)` from the named drive, writing the bytes
/// to `dest_segment:dest_offset`. `AX` reports `0` on success, `1` if
/// the drive slot is empty.
fn disk_read(cpu: &mut Cpu) -> Result<()> {
    let p = disk_read_params(cpu)?;
    let Some(drive) = cpu.bus.drive(p.drive) else {
        cpu.regs.set16(Reg16::Ax, 1);
        return Ok(());
    };
    let lba = (p.cylinder * drive.heads() + p.head) * drive.sectors_per_track() + (p.sector - 1);
    let byte_offset = lba as u64 * drive.sector_size() as u64;
    let byte_size = p.count as usize * drive.sector_size() as usize;
    let data = drive.read(byte_offset, byte_size);
    cpu.bus.write_bytes(linear(p.dest_segment, p.dest_offset), &data)?;
    cpu.regs.set16(Reg16::Ax, 0);
    Ok(())
}

/// Function `0x01`: `CS:AX` points at a small struct — equipment word,
/// base memory size in KiB, hard disk count — copied verbatim into the
/// fixed BIOS data area fields a DOS-era loader reads first.
fn setup_bios_data(cpu: &mut Cpu) -> Result<()> {
    let cs = cpu.regs.get16(Reg16::Cs);
    let ax = cpu.regs.get16(Reg16::Ax);
    let src = linear(cs, ax);
    let equipment_word = cpu.bus.read_u16(src)?;
    let base_memory_kib = cpu.bus.read_u16(src.wrapping_add(2))?;
    let hard_disk_count = cpu.bus.read_u8(src.wrapping_add(4))?;
    cpu.bus.write_u16(bios::BDA_BASE + bios::EQUIPMENT_WORD, equipment_word)?;
    cpu.bus.write_u16(bios::BDA_BASE + bios::BASE_MEMORY_KIB, base_memory_kib)?;
    cpu.bus.write_u8(bios::BDA_BASE + bios::HARD_DISK_COUNT, hard_disk_count)
}

pub fn emulator_trap(cpu: &mut Cpu, instr: &Instruction) -> Result<()> {
    let function = match instr.arg1 {
        Operand::Constant(v) => v as u8,
        _ => unreachable!("the trap function code is always decoded as a constant"),
    };
    match function {
        0x01 => setup_bios_data(cpu),
        0x02 => disk_read(cpu),
        other => Err(Error::InvalidInstruction {
            cs: cpu.regs.get16(Reg16::Cs),
            ip: cpu.regs.get16(Reg16::Ip),
            opcode: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{InstrFlags, InstructionKind};
    use crate::device::DriveOps;

    fn cpu() -> Cpu {
        Cpu::new(&vec![0u8; crate::bus::BIOS_SIZE], 0x100000).unwrap()
    }

    fn trap_instr(function: u8) -> Instruction {
        Instruction {
            kind: InstructionKind::EmulatorTrap,
            flags: InstrFlags::empty(),
            segment_override: None,
            opcode_prefix: 0,
            arg1: Operand::Constant(function as i32),
            arg2: Operand::None,
        }
    }

    struct FakeDrive(Vec<u8>);
    impl DriveOps for FakeDrive {
        fn heads(&self) -> u32 {
            2
        }
        fn sectors_per_track(&self) -> u32 {
            18
        }
        fn cylinders(&self) -> u32 {
            80
        }
        fn sector_size(&self) -> u32 {
            512
        }
        fn is_floppy(&self) -> bool {
            true
        }
        fn read(&self, byte_offset: u64, byte_size: usize) -> Vec<u8> {
            self.0[byte_offset as usize..byte_offset as usize + byte_size].to_vec()
        }
    }

    #[test]
    fn setup_bios_data_copies_fields_from_cs_ax_struct() {
        let mut c = cpu();
        c.set_register(Reg16::Cs, 0x2000);
        c.set_register(Reg16::Ax, 0x10);
        let src = linear(0x2000, 0x10);
        c.write_bytes(src, &[0x34, 0x12, 0x80, 0x02, 0x01]).unwrap();
        emulator_trap(&mut c, &trap_instr(0x01)).unwrap();
        assert_eq!(c.read_bytes(bios::BDA_BASE + bios::EQUIPMENT_WORD, 2).unwrap(), vec![0x34, 0x12]);
        assert_eq!(c.read_bytes(bios::BDA_BASE + bios::BASE_MEMORY_KIB, 2).unwrap(), vec![0x80, 0x02]);
        assert_eq!(c.read_bytes(bios::BDA_BASE + bios::HARD_DISK_COUNT, 1).unwrap(), vec![0x01]);
    }

    #[test]
    fn disk_read_missing_drive_reports_ax_one() {
        let mut c = cpu();
        c.set_register(Reg16::Ss, 0);
        c.set_register(Reg16::Bp, 0x100);
        for (offset, value) in [(2u16, 0u16), (4, 0), (6, 0), (8, 1), (10, 1), (12, 0), (14, 0)] {
            c.write_bytes(linear(0, 0x100 - offset), &value.to_le_bytes()).unwrap();
        }
        emulator_trap(&mut c, &trap_instr(0x02)).unwrap();
        assert_eq!(c.get_register(Reg16::Ax), 1);
    }

    #[test]
    fn disk_read_success_copies_sector_bytes() {
        let mut c = cpu();
        c.attach_device(crate::device::Device::Drive(Box::new(FakeDrive(vec![0xAB; 512])))).unwrap();
        c.set_register(Reg16::Ss, 0);
        c.set_register(Reg16::Bp, 0x200);
        let params = [(2u16, 0u16), (4, 0), (6, 0), (8, 1), (10, 1), (12, 0x1000), (14, 0)];
        for (offset, value) in params {
            c.write_bytes(linear(0, 0x200 - offset), &value.to_le_bytes()).unwrap();
        }
        emulator_trap(&mut c, &trap_instr(0x02)).unwrap();
        assert_eq!(c.get_register(Reg16::Ax), 0);
        assert_eq!(c.read_bytes(linear(0x1000, 0), 512).unwrap(), vec![0xAB; 512]);
    }
}
