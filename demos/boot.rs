//! Boots a BIOS image (and optional floppy image) and runs it to
//! `HLT`. Plays the role of an executable entry point while staying
//! out of the library's test surface.

use std::env;
use std::fs;
use std::process::ExitCode;

use i8086_core::{BatchResult, Cpu, CpuConfig, Device, RawDrive};
use tracing_subscriber::EnvFilter;

const BATCH_SIZE: usize = 1000;

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = env::args().skip(1);
    let Some(bios_path) = args.next() else {
        eprintln!("usage: boot <bios-image> [disk-image]");
        return ExitCode::FAILURE;
    };
    let disk_path = args.next();

    let bios = match fs::read(&bios_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("reading {bios_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = CpuConfig { memory_size: 0x100000, trace: true };
    let mut cpu = match Cpu::with_config(&bios, config) {
        Ok(cpu) => cpu,
        Err(e) => {
            eprintln!("initializing cpu: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = disk_path {
        let data = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("reading {path}: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = cpu.attach_device(Device::Drive(Box::new(RawDrive::floppy_1440k(data)))) {
            eprintln!("attaching disk image: {e}");
            return ExitCode::FAILURE;
        }
    }

    loop {
        match cpu.process_instructions(BATCH_SIZE) {
            Ok(BatchResult::Halted) => {
                tracing::info!("halted");
                break;
            }
            Ok(BatchResult::Completed) => {
                tracing::debug!(batch_size = BATCH_SIZE, "stepped batch");
            }
            Err(e) => {
                eprintln!("execution error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
