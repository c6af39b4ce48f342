//! # Opcode Metadata Table
//!
//! The single source of truth for 6502 instruction metadata. The assembler
//! reads the table forward (mnemonic + addressing mode → opcode byte) and the
//! CPU reads it in reverse (opcode byte → mnemonic + mode). The reverse table
//! and the per-mnemonic variant index are derived once and cached.
//!
//! The table covers the 151 documented encodings of the 56 official
//! instructions. Undocumented opcodes are deliberately absent; decoding one
//! is an execution error.

use crate::addressing::AddressMode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// The 56 documented 6502 instruction mnemonics.
///
/// A closed enum (rather than strings) so that both the assembler's legality
/// checks and the CPU's dispatch are exhaustive matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

impl Mnemonic {
    /// Parse a mnemonic, case-insensitively.
    pub fn parse(text: &str) -> Option<Mnemonic> {
        use Mnemonic::*;
        let upper = text.to_ascii_uppercase();
        let m = match upper.as_str() {
            "ADC" => Adc, "AND" => And, "ASL" => Asl, "BCC" => Bcc,
            "BCS" => Bcs, "BEQ" => Beq, "BIT" => Bit, "BMI" => Bmi,
            "BNE" => Bne, "BPL" => Bpl, "BRK" => Brk, "BVC" => Bvc,
            "BVS" => Bvs, "CLC" => Clc, "CLD" => Cld, "CLI" => Cli,
            "CLV" => Clv, "CMP" => Cmp, "CPX" => Cpx, "CPY" => Cpy,
            "DEC" => Dec, "DEX" => Dex, "DEY" => Dey, "EOR" => Eor,
            "INC" => Inc, "INX" => Inx, "INY" => Iny, "JMP" => Jmp,
            "JSR" => Jsr, "LDA" => Lda, "LDX" => Ldx, "LDY" => Ldy,
            "LSR" => Lsr, "NOP" => Nop, "ORA" => Ora, "PHA" => Pha,
            "PHP" => Php, "PLA" => Pla, "PLP" => Plp, "ROL" => Rol,
            "ROR" => Ror, "RTI" => Rti, "RTS" => Rts, "SBC" => Sbc,
            "SEC" => Sec, "SED" => Sed, "SEI" => Sei, "STA" => Sta,
            "STX" => Stx, "STY" => Sty, "TAX" => Tax, "TAY" => Tay,
            "TSX" => Tsx, "TXA" => Txa, "TXS" => Txs, "TYA" => Tya,
            _ => return None,
        };
        Some(m)
    }

    /// True for the eight conditional branch instructions.
    ///
    /// Branches only support relative addressing, which forces the mode
    /// selection when a label or 16-bit target is used as an operand.
    pub fn is_branch(self) -> bool {
        use Mnemonic::*;
        matches!(self, Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bvc | Bvs)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!("{self:?}").to_ascii_uppercase();
        f.write_str(&text)
    }
}

/// Metadata for one (mnemonic, addressing mode) encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// Addressing mode for this encoding.
    pub mode: AddressMode,

    /// The opcode byte.
    pub opcode: u8,

    /// Total instruction size in bytes (opcode + operands, 1-3).
    pub size: u8,

    /// Base cycle cost, excluding page-crossing penalties.
    pub base_cycles: u8,

    /// Whether this encoding pays +1 cycle when the indexed effective
    /// address crosses a page boundary. Only read-style AbsoluteX,
    /// AbsoluteY and IndirectY encodings do; write-style encodings always
    /// pay the index cycle instead.
    pub page_cross_penalty: bool,
}

const fn op(
    mnemonic: Mnemonic,
    mode: AddressMode,
    opcode: u8,
    size: u8,
    base_cycles: u8,
    page_cross_penalty: bool,
) -> OpcodeInfo {
    OpcodeInfo { mnemonic, mode, opcode, size, base_cycles, page_cross_penalty }
}

/// All 151 documented encodings.
#[rustfmt::skip]
pub static OPCODE_TABLE: [OpcodeInfo; 151] = {
    use AddressMode::*;
    use Mnemonic::*;
    [
        op(Adc, Immediate,   0x69, 2, 2, false),
        op(Adc, ZeroPage,    0x65, 2, 3, false),
        op(Adc, ZeroPageX,   0x75, 2, 4, false),
        op(Adc, Absolute,    0x6D, 3, 4, false),
        op(Adc, AbsoluteX,   0x7D, 3, 4, true),
        op(Adc, AbsoluteY,   0x79, 3, 4, true),
        op(Adc, IndirectX,   0x61, 2, 6, false),
        op(Adc, IndirectY,   0x71, 2, 5, true),

        op(And, Immediate,   0x29, 2, 2, false),
        op(And, ZeroPage,    0x25, 2, 3, false),
        op(And, ZeroPageX,   0x35, 2, 4, false),
        op(And, Absolute,    0x2D, 3, 4, false),
        op(And, AbsoluteX,   0x3D, 3, 4, true),
        op(And, AbsoluteY,   0x39, 3, 4, true),
        op(And, IndirectX,   0x21, 2, 6, false),
        op(And, IndirectY,   0x31, 2, 5, true),

        op(Asl, Accumulator, 0x0A, 1, 2, false),
        op(Asl, ZeroPage,    0x06, 2, 5, false),
        op(Asl, ZeroPageX,   0x16, 2, 6, false),
        op(Asl, Absolute,    0x0E, 3, 6, false),
        op(Asl, AbsoluteX,   0x1E, 3, 7, false),

        op(Bcc, Relative,    0x90, 2, 2, false),
        op(Bcs, Relative,    0xB0, 2, 2, false),
        op(Beq, Relative,    0xF0, 2, 2, false),
        op(Bmi, Relative,    0x30, 2, 2, false),
        op(Bne, Relative,    0xD0, 2, 2, false),
        op(Bpl, Relative,    0x10, 2, 2, false),
        op(Bvc, Relative,    0x50, 2, 2, false),
        op(Bvs, Relative,    0x70, 2, 2, false),

        op(Bit, ZeroPage,    0x24, 2, 3, false),
        op(Bit, Absolute,    0x2C, 3, 4, false),

        op(Brk, Implied,     0x00, 1, 7, false),

        op(Clc, Implied,     0x18, 1, 2, false),
        op(Cld, Implied,     0xD8, 1, 2, false),
        op(Cli, Implied,     0x58, 1, 2, false),
        op(Clv, Implied,     0xB8, 1, 2, false),

        op(Cmp, Immediate,   0xC9, 2, 2, false),
        op(Cmp, ZeroPage,    0xC5, 2, 3, false),
        op(Cmp, ZeroPageX,   0xD5, 2, 4, false),
        op(Cmp, Absolute,    0xCD, 3, 4, false),
        op(Cmp, AbsoluteX,   0xDD, 3, 4, true),
        op(Cmp, AbsoluteY,   0xD9, 3, 4, true),
        op(Cmp, IndirectX,   0xC1, 2, 6, false),
        op(Cmp, IndirectY,   0xD1, 2, 5, true),

        op(Cpx, Immediate,   0xE0, 2, 2, false),
        op(Cpx, ZeroPage,    0xE4, 2, 3, false),
        op(Cpx, Absolute,    0xEC, 3, 4, false),

        op(Cpy, Immediate,   0xC0, 2, 2, false),
        op(Cpy, ZeroPage,    0xC4, 2, 3, false),
        op(Cpy, Absolute,    0xCC, 3, 4, false),

        op(Dec, ZeroPage,    0xC6, 2, 5, false),
        op(Dec, ZeroPageX,   0xD6, 2, 6, false),
        op(Dec, Absolute,    0xCE, 3, 6, false),
        op(Dec, AbsoluteX,   0xDE, 3, 7, false),

        op(Dex, Implied,     0xCA, 1, 2, false),
        op(Dey, Implied,     0x88, 1, 2, false),

        op(Eor, Immediate,   0x49, 2, 2, false),
        op(Eor, ZeroPage,    0x45, 2, 3, false),
        op(Eor, ZeroPageX,   0x55, 2, 4, false),
        op(Eor, Absolute,    0x4D, 3, 4, false),
        op(Eor, AbsoluteX,   0x5D, 3, 4, true),
        op(Eor, AbsoluteY,   0x59, 3, 4, true),
        op(Eor, IndirectX,   0x41, 2, 6, false),
        op(Eor, IndirectY,   0x51, 2, 5, true),

        op(Inc, ZeroPage,    0xE6, 2, 5, false),
        op(Inc, ZeroPageX,   0xF6, 2, 6, false),
        op(Inc, Absolute,    0xEE, 3, 6, false),
        op(Inc, AbsoluteX,   0xFE, 3, 7, false),

        op(Inx, Implied,     0xE8, 1, 2, false),
        op(Iny, Implied,     0xC8, 1, 2, false),

        op(Jmp, Absolute,    0x4C, 3, 3, false),
        op(Jmp, Indirect,    0x6C, 3, 5, false),

        op(Jsr, Absolute,    0x20, 3, 6, false),

        op(Lda, Immediate,   0xA9, 2, 2, false),
        op(Lda, ZeroPage,    0xA5, 2, 3, false),
        op(Lda, ZeroPageX,   0xB5, 2, 4, false),
        op(Lda, Absolute,    0xAD, 3, 4, false),
        op(Lda, AbsoluteX,   0xBD, 3, 4, true),
        op(Lda, AbsoluteY,   0xB9, 3, 4, true),
        op(Lda, IndirectX,   0xA1, 2, 6, false),
        op(Lda, IndirectY,   0xB1, 2, 5, true),

        op(Ldx, Immediate,   0xA2, 2, 2, false),
        op(Ldx, ZeroPage,    0xA6, 2, 3, false),
        op(Ldx, ZeroPageY,   0xB6, 2, 4, false),
        op(Ldx, Absolute,    0xAE, 3, 4, false),
        op(Ldx, AbsoluteY,   0xBE, 3, 4, true),

        op(Ldy, Immediate,   0xA0, 2, 2, false),
        op(Ldy, ZeroPage,    0xA4, 2, 3, false),
        op(Ldy, ZeroPageX,   0xB4, 2, 4, false),
        op(Ldy, Absolute,    0xAC, 3, 4, false),
        op(Ldy, AbsoluteX,   0xBC, 3, 4, true),

        op(Lsr, Accumulator, 0x4A, 1, 2, false),
        op(Lsr, ZeroPage,    0x46, 2, 5, false),
        op(Lsr, ZeroPageX,   0x56, 2, 6, false),
        op(Lsr, Absolute,    0x4E, 3, 6, false),
        op(Lsr, AbsoluteX,   0x5E, 3, 7, false),

        op(Nop, Implied,     0xEA, 1, 2, false),

        op(Ora, Immediate,   0x09, 2, 2, false),
        op(Ora, ZeroPage,    0x05, 2, 3, false),
        op(Ora, ZeroPageX,   0x15, 2, 4, false),
        op(Ora, Absolute,    0x0D, 3, 4, false),
        op(Ora, AbsoluteX,   0x1D, 3, 4, true),
        op(Ora, AbsoluteY,   0x19, 3, 4, true),
        op(Ora, IndirectX,   0x01, 2, 6, false),
        op(Ora, IndirectY,   0x11, 2, 5, true),

        op(Pha, Implied,     0x48, 1, 3, false),
        op(Php, Implied,     0x08, 1, 3, false),
        op(Pla, Implied,     0x68, 1, 4, false),
        op(Plp, Implied,     0x28, 1, 4, false),

        op(Rol, Accumulator, 0x2A, 1, 2, false),
        op(Rol, ZeroPage,    0x26, 2, 5, false),
        op(Rol, ZeroPageX,   0x36, 2, 6, false),
        op(Rol, Absolute,    0x2E, 3, 6, false),
        op(Rol, AbsoluteX,   0x3E, 3, 7, false),

        op(Ror, Accumulator, 0x6A, 1, 2, false),
        op(Ror, ZeroPage,    0x66, 2, 5, false),
        op(Ror, ZeroPageX,   0x76, 2, 6, false),
        op(Ror, Absolute,    0x6E, 3, 6, false),
        op(Ror, AbsoluteX,   0x7E, 3, 7, false),

        op(Rti, Implied,     0x40, 1, 6, false),
        op(Rts, Implied,     0x60, 1, 6, false),

        op(Sbc, Immediate,   0xE9, 2, 2, false),
        op(Sbc, ZeroPage,    0xE5, 2, 3, false),
        op(Sbc, ZeroPageX,   0xF5, 2, 4, false),
        op(Sbc, Absolute,    0xED, 3, 4, false),
        op(Sbc, AbsoluteX,   0xFD, 3, 4, true),
        op(Sbc, AbsoluteY,   0xF9, 3, 4, true),
        op(Sbc, IndirectX,   0xE1, 2, 6, false),
        op(Sbc, IndirectY,   0xF1, 2, 5, true),

        op(Sec, Implied,     0x38, 1, 2, false),
        op(Sed, Implied,     0xF8, 1, 2, false),
        op(Sei, Implied,     0x78, 1, 2, false),

        op(Sta, ZeroPage,    0x85, 2, 3, false),
        op(Sta, ZeroPageX,   0x95, 2, 4, false),
        op(Sta, Absolute,    0x8D, 3, 4, false),
        op(Sta, AbsoluteX,   0x9D, 3, 5, false),
        op(Sta, AbsoluteY,   0x99, 3, 5, false),
        op(Sta, IndirectX,   0x81, 2, 6, false),
        op(Sta, IndirectY,   0x91, 2, 6, false),

        op(Stx, ZeroPage,    0x86, 2, 3, false),
        op(Stx, ZeroPageY,   0x96, 2, 4, false),
        op(Stx, Absolute,    0x8E, 3, 4, false),

        op(Sty, ZeroPage,    0x84, 2, 3, false),
        op(Sty, ZeroPageX,   0x94, 2, 4, false),
        op(Sty, Absolute,    0x8C, 3, 4, false),

        op(Tax, Implied,     0xAA, 1, 2, false),
        op(Tay, Implied,     0xA8, 1, 2, false),
        op(Tsx, Implied,     0xBA, 1, 2, false),
        op(Txa, Implied,     0x8A, 1, 2, false),
        op(Txs, Implied,     0x9A, 1, 2, false),
        op(Tya, Implied,     0x98, 1, 2, false),
    ]
};

/// Reverse table: opcode byte → metadata. Derived from [`OPCODE_TABLE`] on
/// first use.
static DECODE_TABLE: Lazy<[Option<&'static OpcodeInfo>; 256]> = Lazy::new(|| {
    let mut table = [None; 256];
    for info in OPCODE_TABLE.iter() {
        debug_assert!(table[info.opcode as usize].is_none());
        table[info.opcode as usize] = Some(info);
    }
    table
});

/// Forward index: mnemonic → all of its encodings. Derived once.
static VARIANT_INDEX: Lazy<HashMap<Mnemonic, Vec<&'static OpcodeInfo>>> = Lazy::new(|| {
    let mut index: HashMap<Mnemonic, Vec<&'static OpcodeInfo>> = HashMap::new();
    for info in OPCODE_TABLE.iter() {
        index.entry(info.mnemonic).or_default().push(info);
    }
    index
});

/// Look up an opcode byte. Returns `None` for undocumented opcodes.
pub fn decode(opcode: u8) -> Option<&'static OpcodeInfo> {
    DECODE_TABLE[opcode as usize]
}

/// All encodings of a mnemonic, in table order.
pub fn variants_of(mnemonic: Mnemonic) -> &'static [&'static OpcodeInfo] {
    VARIANT_INDEX
        .get(&mnemonic)
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

/// Find the encoding of a mnemonic in one specific addressing mode.
pub fn lookup(mnemonic: Mnemonic, mode: AddressMode) -> Option<&'static OpcodeInfo> {
    variants_of(mnemonic).iter().copied().find(|info| info.mode == mode)
}
