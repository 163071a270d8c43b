//! The static first-byte opcode table and the five ModR/M-`reg`-field
//! group sub-tables (`0x80`-`83`, `0xC0`-`C1`/`0xD0`-`D3`, `0xF6`-`F7`,
//! `0xFE`-`FF`). Mirrors the table-driven opcode-dispatch pattern used
//! elsewhere in this crate, just keyed on an instruction template
//! instead of a handler pointer since decoding and execution are
//! separate passes here.

use super::{Condition, InstrFlags, InstructionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandTemplate {
    None,
    /// Fixed `AL`/`AX` (width follows `InstrFlags::SIZE8`).
    Accumulator,
    Cl,
    Dx,
    One,
    Three,
    /// Fixed word register (`PUSH`/`POP`/`INC`/`DEC`/`XCHG` short forms).
    FixedReg16(u8),
    FixedSeg(super::SegReg),
    /// `Ib`: 8-bit immediate, widened per `InstrFlags::SIGN_EXTEND`.
    Ib,
    /// `Iw`: 16-bit immediate.
    Iw,
    /// `Jb`/`Jw`: signed relative displacement, byte- or word-sized.
    Jb,
    Jw,
    /// `Ob`/`Ow`: a direct memory offset (same for byte or word; width
    /// is carried by `InstrFlags::SIZE8`).
    Ob,
    /// `Ap`: immediate far pointer (`CALL`/`JMP` direct-far forms).
    Ap,
    /// `Eb`/`Ew`: ModR/M register-or-memory.
    E,
    /// `M`: ModR/M memory-only (`LEA`, `LDS`, `LES`).
    M,
    /// `Gb`/`Gw`: ModR/M `reg` field as a general register.
    G,
    /// `Sw`: ModR/M `reg` field as a segment register.
    S,
    /// Dispatches through one of the ModR/M-`reg`-field group tables.
    Group(GroupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupId {
    Group1, // 0x80-83: ALU op selected by reg field, Eb/Ev, Ib/Iz/Ib(sign-extend)
    Group2, // 0xC0/C1/D0-D3: shift/rotate selected by reg field
    Group3, // 0xF6/F7: TEST/NOT/NEG/MUL/IMUL/DIV/IDIV
    Group4, // 0xFE: INC/DEC Eb
    Group5, // 0xFF: INC/DEC/CALL/CALLF/JMP/JMPF/PUSH Ev
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub kind: InstructionKind,
    pub arg1: OperandTemplate,
    pub arg2: OperandTemplate,
    pub flags: InstrFlags,
}

fn entry(kind: InstructionKind, arg1: OperandTemplate, arg2: OperandTemplate, flags: InstrFlags) -> OpcodeEntry {
    OpcodeEntry { kind, arg1, arg2, flags }
}

macro_rules! flags {
    () => { InstrFlags::empty() };
    ($($f:ident)|+) => { InstrFlags::from_bits_truncate(0 $(| InstrFlags::$f.bits())+) };
}

/// The six opcodes belonging to one "ALU block" (`ADD` at `0x00`,
/// `OR` at `0x08`, ... `CMP` at `0x38`): `Eb,Gb`; `Ew,Gw`; `Gb,Eb`;
/// `Gw,Ew`; `AL,Ib`; `AX,Iw`.
fn alu_block(base: u8, kind: InstructionKind) -> [(u8, OpcodeEntry); 6] {
    [
        (base, entry(kind, OperandTemplate::E, OperandTemplate::G, flags!(SIZE8 | HAS_RM))),
        (base + 1, entry(kind, OperandTemplate::E, OperandTemplate::G, flags!(HAS_RM))),
        (base + 2, entry(kind, OperandTemplate::G, OperandTemplate::E, flags!(SIZE8 | HAS_RM))),
        (base + 3, entry(kind, OperandTemplate::G, OperandTemplate::E, flags!(HAS_RM))),
        (base + 4, entry(kind, OperandTemplate::Accumulator, OperandTemplate::Ib, flags!(SIZE8))),
        (base + 5, entry(kind, OperandTemplate::Accumulator, OperandTemplate::Iw, flags!())),
    ]
}

pub fn lookup(opcode: u8) -> OpcodeEntry {
    use InstructionKind::*;
    use OperandTemplate::*;

    for (op, e) in alu_block(0x00, Add) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x08, Or) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x10, Adc) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x18, Sbb) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x20, And) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x28, Sub) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x30, Xor) { if op == opcode { return e; } }
    for (op, e) in alu_block(0x38, Cmp) { if op == opcode { return e; } }

    match opcode {
        0x06 => entry(Push, FixedSeg(super::SegReg::Es), None, flags!()),
        0x07 => entry(Pop, FixedSeg(super::SegReg::Es), None, flags!()),
        0x0E => entry(Push, FixedSeg(super::SegReg::Cs), None, flags!()),
        0x0F => entry(Invalid, None, None, flags!()), // two-byte escape, handled in decoder
        0x16 => entry(Push, FixedSeg(super::SegReg::Ss), None, flags!()),
        0x17 => entry(Pop, FixedSeg(super::SegReg::Ss), None, flags!()),
        0x1E => entry(Push, FixedSeg(super::SegReg::Ds), None, flags!()),
        0x1F => entry(Pop, FixedSeg(super::SegReg::Ds), None, flags!()),
        0x26 | 0x2E | 0x36 | 0x3E => entry(Invalid, None, None, flags!()), // segment override prefixes
        0x27 => entry(Daa, None, None, flags!()),
        0x2F => entry(Das, None, None, flags!()),
        0x37 => entry(Aaa, None, None, flags!()),
        0x3F => entry(Aas, None, None, flags!()),

        0x40..=0x47 => entry(Inc, FixedReg16(opcode - 0x40), None, flags!()),
        0x48..=0x4F => entry(Dec, FixedReg16(opcode - 0x48), None, flags!()),
        0x50..=0x57 => entry(Push, FixedReg16(opcode - 0x50), None, flags!()),
        0x58..=0x5F => entry(Pop, FixedReg16(opcode - 0x58), None, flags!()),

        0x70 => entry(Jcc(Condition::O), Jb, None, flags!()),
        0x71 => entry(Jcc(Condition::No), Jb, None, flags!()),
        0x72 => entry(Jcc(Condition::B), Jb, None, flags!()),
        0x73 => entry(Jcc(Condition::Nb), Jb, None, flags!()),
        0x74 => entry(Jcc(Condition::E), Jb, None, flags!()),
        0x75 => entry(Jcc(Condition::Ne), Jb, None, flags!()),
        0x76 => entry(Jcc(Condition::Be), Jb, None, flags!()),
        0x77 => entry(Jcc(Condition::A), Jb, None, flags!()),
        0x78 => entry(Jcc(Condition::S), Jb, None, flags!()),
        0x79 => entry(Jcc(Condition::Ns), Jb, None, flags!()),
        0x7A => entry(Jcc(Condition::P), Jb, None, flags!()),
        0x7B => entry(Jcc(Condition::Np), Jb, None, flags!()),
        0x7C => entry(Jcc(Condition::L), Jb, None, flags!()),
        0x7D => entry(Jcc(Condition::Ge), Jb, None, flags!()),
        0x7E => entry(Jcc(Condition::Le), Jb, None, flags!()),
        0x7F => entry(Jcc(Condition::G), Jb, None, flags!()),

        0x80 => entry(Invalid, Group(GroupId::Group1), Ib, flags!(SIZE8 | HAS_RM)),
        0x81 => entry(Invalid, Group(GroupId::Group1), Iw, flags!(HAS_RM)),
        0x82 => entry(Invalid, Group(GroupId::Group1), Ib, flags!(SIZE8 | HAS_RM)),
        0x83 => entry(Invalid, Group(GroupId::Group1), Ib, flags!(HAS_RM | SIGN_EXTEND)),

        0x84 => entry(Test, E, G, flags!(SIZE8 | HAS_RM)),
        0x85 => entry(Test, E, G, flags!(HAS_RM)),
        0x86 => entry(Xchg, E, G, flags!(SIZE8 | HAS_RM)),
        0x87 => entry(Xchg, E, G, flags!(HAS_RM)),
        0x88 => entry(Mov, E, G, flags!(SIZE8 | HAS_RM)),
        0x89 => entry(Mov, E, G, flags!(HAS_RM)),
        0x8A => entry(Mov, G, E, flags!(SIZE8 | HAS_RM)),
        0x8B => entry(Mov, G, E, flags!(HAS_RM)),
        0x8C => entry(Mov, E, S, flags!(HAS_RM)),
        0x8D => entry(Lea, G, M, flags!(HAS_RM)),
        0x8E => entry(Mov, S, E, flags!(HAS_RM)),
        0x8F => entry(Pop, E, None, flags!(HAS_RM)),

        0x90 => entry(Nop, None, None, flags!()),
        0x91..=0x97 => entry(Xchg, Accumulator, FixedReg16(opcode - 0x90), flags!()),
        0x98 => entry(Cbw, None, None, flags!()),
        0x99 => entry(Cwd, None, None, flags!()),
        0x9A => entry(CallFar, Ap, None, flags!()),
        0x9B => entry(Wait, None, None, flags!()),
        0x9C => entry(Pushf, None, None, flags!()),
        0x9D => entry(Popf, None, None, flags!()),
        0x9E => entry(Sahf, None, None, flags!()),
        0x9F => entry(Lahf, None, None, flags!()),

        0xA0 => entry(Mov, Accumulator, Ob, flags!(SIZE8)),
        0xA1 => entry(Mov, Accumulator, Ob, flags!()),
        0xA2 => entry(Mov, Ob, Accumulator, flags!(SIZE8)),
        0xA3 => entry(Mov, Ob, Accumulator, flags!()),
        0xA4 => entry(Movs, None, None, flags!(SIZE8)),
        0xA5 => entry(Movs, None, None, flags!()),
        0xA6 => entry(Cmps, None, None, flags!(SIZE8)),
        0xA7 => entry(Cmps, None, None, flags!()),
        0xA8 => entry(Test, Accumulator, Ib, flags!(SIZE8)),
        0xA9 => entry(Test, Accumulator, Iw, flags!()),
        0xAA => entry(Stos, None, None, flags!(SIZE8)),
        0xAB => entry(Stos, None, None, flags!()),
        0xAC => entry(Lods, None, None, flags!(SIZE8)),
        0xAD => entry(Lods, None, None, flags!()),
        0xAE => entry(Scas, None, None, flags!(SIZE8)),
        0xAF => entry(Scas, None, None, flags!()),

        0xB0..=0xB7 => entry(Mov, FixedReg16(opcode - 0xB0), Ib, flags!(SIZE8)),
        0xB8..=0xBF => entry(Mov, FixedReg16(opcode - 0xB8), Iw, flags!()),

        0xC0 => entry(Invalid, Group(GroupId::Group2), Ib, flags!(SIZE8 | HAS_RM)),
        0xC1 => entry(Invalid, Group(GroupId::Group2), Ib, flags!(HAS_RM)),
        0xC2 => entry(RetNear, Iw, None, flags!()),
        0xC3 => entry(RetNear, None, None, flags!()),
        0xC4 => entry(Les, G, M, flags!(HAS_RM)),
        0xC5 => entry(Lds, G, M, flags!(HAS_RM)),
        0xC6 => entry(Mov, E, Ib, flags!(SIZE8 | HAS_RM)),
        0xC7 => entry(Mov, E, Iw, flags!(HAS_RM)),
        0xCA => entry(RetFar, Iw, None, flags!()),
        0xCB => entry(RetFar, None, None, flags!()),
        0xCC => entry(Int, Three, None, flags!()),
        0xCD => entry(Int, Ib, None, flags!()),
        0xCE => entry(Into, None, None, flags!()),
        0xCF => entry(Iret, None, None, flags!()),

        0xD0 => entry(Invalid, Group(GroupId::Group2), One, flags!(SIZE8 | HAS_RM)),
        0xD1 => entry(Invalid, Group(GroupId::Group2), One, flags!(HAS_RM)),
        0xD2 => entry(Invalid, Group(GroupId::Group2), Cl, flags!(SIZE8 | HAS_RM)),
        0xD3 => entry(Invalid, Group(GroupId::Group2), Cl, flags!(HAS_RM)),
        0xD4 => entry(Aam, Ib, None, flags!()),
        0xD5 => entry(Aad, Ib, None, flags!()),
        0xD7 => entry(Xlat, None, None, flags!()),

        0xE0 => entry(Loopnz, Jb, None, flags!()),
        0xE1 => entry(Loopz, Jb, None, flags!()),
        0xE2 => entry(Loop, Jb, None, flags!()),
        0xE3 => entry(Jcxz, Jb, None, flags!()),
        0xE4 => entry(In, Accumulator, Ib, flags!(SIZE8)),
        0xE5 => entry(In, Accumulator, Ib, flags!()),
        0xE6 => entry(Out, Ib, Accumulator, flags!(SIZE8)),
        0xE7 => entry(Out, Ib, Accumulator, flags!()),
        0xE8 => entry(CallNearRel, Jw, None, flags!()),
        0xE9 => entry(JmpNearRel, Jw, None, flags!()),
        0xEA => entry(JmpFar, Ap, None, flags!()),
        0xEB => entry(JmpNearRel, Jb, None, flags!()),
        0xEC => entry(In, Accumulator, Dx, flags!(SIZE8)),
        0xED => entry(In, Accumulator, Dx, flags!()),
        0xEE => entry(Out, Dx, Accumulator, flags!(SIZE8)),
        0xEF => entry(Out, Dx, Accumulator, flags!()),

        0xF4 => entry(Hlt, None, None, flags!()),
        0xF5 => entry(Cmc, None, None, flags!()),
        0xF6 => entry(Invalid, Group(GroupId::Group3), None, flags!(SIZE8 | HAS_RM)),
        0xF7 => entry(Invalid, Group(GroupId::Group3), None, flags!(HAS_RM)),
        0xF8 => entry(Clc, None, None, flags!()),
        0xF9 => entry(Stc, None, None, flags!()),
        0xFA => entry(Cli, None, None, flags!()),
        0xFB => entry(Sti, None, None, flags!()),
        0xFC => entry(Cld, None, None, flags!()),
        0xFD => entry(Std, None, None, flags!()),
        0xFE => entry(Invalid, Group(GroupId::Group4), None, flags!(SIZE8 | HAS_RM)),
        0xFF => entry(Invalid, Group(GroupId::Group5), None, flags!(HAS_RM)),

        _ => entry(Invalid, None, None, flags!()),
    }
}

/// `0x80`-`0x83`: the ALU op is selected by the ModR/M `reg` field,
/// `Eb`/`Ev` by the opcode's own `SIZE8` flag.
pub fn group1(reg: u8) -> InstructionKind {
    use InstructionKind::*;
    match reg & 0b111 {
        0 => Add,
        1 => Or,
        2 => Adc,
        3 => Sbb,
        4 => And,
        5 => Sub,
        6 => Xor,
        7 => Cmp,
        _ => unreachable!("masked to three bits"),
    }
}

/// `0xC0`/`0xC1`/`0xD0`-`0xD3`: shift/rotate selected by `reg`.
pub fn group2(reg: u8) -> InstructionKind {
    use InstructionKind::*;
    match reg & 0b111 {
        0 => Rol,
        1 => Ror,
        2 => Rcl,
        3 => Rcr,
        4 => Shl,
        5 => Shr,
        6 => Shl, // undocumented alias on real silicon; treat as SHL
        7 => Sar,
        _ => unreachable!("masked to three bits"),
    }
}

/// `0xF6`/`0xF7`: `reg` selects the unary/multiply/divide group.
/// `reg` in `{0, 1}` are both `TEST Eb/Ev, Ib/Iz`.
pub fn group3(reg: u8) -> (InstructionKind, OperandTemplate) {
    use InstructionKind::*;
    use OperandTemplate::*;
    match reg & 0b111 {
        0 | 1 => (Test, Ib),
        2 => (Not, None),
        3 => (Neg, None),
        4 => (Mul, None),
        5 => (Imul, None),
        6 => (Div, None),
        7 => (Idiv, None),
        _ => unreachable!("masked to three bits"),
    }
}

/// `0xFE`: only `INC`/`DEC Eb` are defined.
pub fn group4(reg: u8) -> InstructionKind {
    match reg & 0b111 {
        0 => InstructionKind::Inc,
        _ => InstructionKind::Dec,
    }
}

/// `0xFF`: `INC`/`DEC`/`CALL`/`CALLF`/`JMP`/`JMPF`/`PUSH Ev`.
pub fn group5(reg: u8) -> InstructionKind {
    use InstructionKind::*;
    match reg & 0b111 {
        0 => Inc,
        1 => Dec,
        2 => CallNearAbs,
        3 => CallFar,
        4 => JmpNearAbs,
        5 => JmpFar,
        6 => Push,
        _ => Invalid,
    }
}
