//! # Addressing Modes
//!
//! This module defines the 13 addressing modes supported by the 6502 processor.
//! Each mode determines how an instruction interprets its operand bytes, both
//! when the assembler encodes an operand and when the CPU computes an
//! effective address.

/// 6502 addressing mode enumeration.
///
/// The addressing mode determines how many operand bytes follow an opcode and
/// how those bytes are turned into an effective address (or an inline value).
///
/// # Operand Sizes
///
/// - **0 bytes**: Implied, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implied,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: ASL A, LSR A, ROL A
    Accumulator,

    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X register (wraps within zero page).
    ZeroPageX,

    /// Zero page address indexed by Y register (wraps within zero page).
    ZeroPageY,

    /// Signed 8-bit offset for branch instructions, measured from the byte
    /// after the operand.
    Relative,

    /// Full 16-bit address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X register.
    ///
    /// May incur a +1 cycle penalty if a page boundary is crossed.
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    ///
    /// May incur a +1 cycle penalty if a page boundary is crossed.
    AbsoluteY,

    /// Indirect jump through a 16-bit pointer. Only used by JMP.
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressMode {
    /// Number of operand bytes that follow the opcode for this mode.
    pub fn operand_size(self) -> u8 {
        match self {
            AddressMode::Implied | AddressMode::Accumulator => 0,
            AddressMode::Immediate
            | AddressMode::ZeroPage
            | AddressMode::ZeroPageX
            | AddressMode::ZeroPageY
            | AddressMode::Relative
            | AddressMode::IndirectX
            | AddressMode::IndirectY => 1,
            AddressMode::Absolute
            | AddressMode::AbsoluteX
            | AddressMode::AbsoluteY
            | AddressMode::Indirect => 2,
        }
    }
}
