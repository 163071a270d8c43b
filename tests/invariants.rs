//! Invariants that must hold across arbitrary instruction streams,
//! not just the instructions that establish them: `IP` advances by
//! exactly the encoded length outside of control transfers, bit 1 of
//! `FLAGS` is always set, byte writes never disturb the other half of
//! their word register, and a faulting bus/port access leaves state
//! untouched.

use i8086_core::{flag, BatchResult, Cpu, Reg16, Reg8};

fn harness(program: &[u8]) -> Cpu {
    let bios = vec![0u8; i8086_core::BIOS_SIZE];
    let mut cpu = Cpu::new(&bios, 0x100000).unwrap();
    cpu.set_register(Reg16::Cs, 0);
    cpu.set_register(Reg16::Ip, 0);
    cpu.set_register(Reg16::Ss, 0);
    cpu.set_register(Reg16::Sp, 0xFFFE);
    cpu.write_bytes(0, program).unwrap();
    cpu
}

#[test]
fn ip_advances_by_exact_encoded_length_without_control_transfer() {
    // MOV AX,imm16 (3 bytes); INC AX (1 byte); ADD AX,imm16 (3 bytes); HLT (1 byte)
    let mut cpu = harness(&[0xB8, 0x00, 0x00, 0x40, 0x05, 0x01, 0x00, 0xF4]);
    cpu.process_single_instruction().unwrap();
    assert_eq!(cpu.get_register(Reg16::Ip), 3);
    cpu.process_single_instruction().unwrap();
    assert_eq!(cpu.get_register(Reg16::Ip), 4);
    cpu.process_single_instruction().unwrap();
    assert_eq!(cpu.get_register(Reg16::Ip), 7);
}

#[test]
fn flags_bit_one_is_always_set() {
    let mut cpu = harness(&[0xB8, 0x00, 0x00, 0xF4]);
    assert!(cpu.flags() & flag::ALWAYS_ONE != 0, "reset state");
    assert_eq!(cpu.process_instructions(10).unwrap(), BatchResult::Halted);
    assert!(cpu.flags() & flag::ALWAYS_ONE != 0, "after running a program");
    cpu.set_flags(0x0000);
    assert!(cpu.flags() & flag::ALWAYS_ONE != 0, "even an explicit all-zero write keeps bit 1 pinned");
}

#[test]
fn byte_register_write_preserves_the_other_half() {
    // MOV AX,0xBEEF; MOV AL,0x11; HLT
    let mut cpu = harness(&[0xB8, 0xEF, 0xBE, 0xB0, 0x11, 0xF4]);
    assert_eq!(cpu.process_instructions(10).unwrap(), BatchResult::Halted);
    assert_eq!(cpu.get_register(Reg16::Ax), 0xBE11);
    assert_eq!(cpu.get_register8(Reg8::Ah), 0xBE);
    assert_eq!(cpu.get_register8(Reg8::Al), 0x11);
}

#[test]
fn write_beyond_ram_errors_without_corrupting_registers() {
    let bios = vec![0u8; i8086_core::BIOS_SIZE];
    let mut cpu = Cpu::new(&bios, 0x1000).unwrap(); // only one 4 KiB page of RAM
    cpu.set_register(Reg16::Cs, 0);
    cpu.set_register(Reg16::Ip, 0);
    cpu.set_register8(Reg8::Al, 0x42);
    // MOV [0x2000],AL  => A2 00 20 (direct address, outside the 0x1000-byte RAM)
    cpu.write_bytes(0, &[0xA2, 0x00, 0x20]).unwrap();
    let err = cpu.process_instructions(10).unwrap_err();
    assert!(matches!(err, i8086_core::Error::UnmappedBusAccess { addr: 0x2000 }));
    assert_eq!(cpu.get_register8(Reg8::Al), 0x42, "the failed write must not touch AL");
    assert!(!cpu.is_halted());
}

#[test]
fn unbound_port_write_errors_without_corrupting_registers() {
    // MOV AL,0x7E; OUT 0x99,AL  => B0 7E; E6 99
    let mut cpu = harness(&[0xB0, 0x7E, 0xE6, 0x99]);
    let err = cpu.process_instructions(10).unwrap_err();
    assert!(matches!(err, i8086_core::Error::UnboundPort { port: 0x99 }));
    assert_eq!(cpu.get_register8(Reg8::Al), 0x7E);
}
