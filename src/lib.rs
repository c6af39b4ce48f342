//! # emu6502
//!
//! The core of a 6502 toolchain: a symbolic assembler that turns MOS 6502
//! assembly source into a sparse binary image with symbol and relocation
//! tables, and a cycle-accurate instruction interpreter that executes such
//! an image against a memory-mapped address space.
//!
//! ## Quick Start
//!
//! ```rust
//! use emu6502::{assembler::compile_str, Clock, Cpu, ExecutionError, Memory16, Ram};
//! use std::time::Duration;
//!
//! let program = compile_str(
//!     ".org $2000\n\
//!      start:\n\
//!      LDA #$07\n\
//!      STA $42\n\
//!      BRK\n",
//! )
//! .unwrap();
//!
//! let clock = Clock::new();
//! let mut memory = Ram::new(&clock);
//! memory.write_sparse(&program.sparse_binary_code).unwrap();
//!
//! let mut cpu = Cpu::new(&mut memory, &clock);
//! cpu.reg.program_counter = program.symbol_offset("start").unwrap();
//!
//! match cpu.execute_with_timeout(Duration::from_secs(1)) {
//!     Err(ExecutionError::Halted { .. }) => {} // BRK reached
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! assert_eq!(memory.load(0x42).unwrap(), 0x07);
//! ```
//!
//! ## Architecture
//!
//! - **Table-driven**: one opcode table is the single source of truth; the
//!   assembler reads it forward, the CPU decodes through its cached
//!   reverse.
//! - **Cycle accuracy**: every single-byte memory access ticks the shared
//!   [`Clock`]; instructions add their internal cycles explicitly.
//! - **Borrowed resources**: the CPU holds non-owning references to memory
//!   and clock — both outlive the run, and a dropped CPU leaves memory
//!   inspectable.
//!
//! ## Modules
//!
//! - [`assembler`] - tokenizer, argument parser, compilation context
//! - [`program`] - sparse image, symbols, relocations, aliases
//! - [`opcodes`] - opcode metadata table
//! - [`cpu`] - register file and fetch-decode-execute loop
//! - [`memory`] / [`devices`] - flat RAM and the memory mapper
//! - [`clock`] - cycle counter with optional wall-clock pacing

pub mod addressing;
pub mod assembler;
pub mod clock;
pub mod cpu;
pub mod devices;
pub mod memory;
pub mod opcodes;
pub mod program;

mod instructions;

pub use addressing::AddressMode;
pub use assembler::{compile_str, AsmErrorKind, AssemblerError};
pub use clock::Clock;
pub use cpu::{Cpu, Registers};
pub use devices::{Device, MemoryMapper16, MountError, RamDevice, RomDevice};
pub use memory::{BusError, Memory16, Ram};
pub use opcodes::{Mnemonic, OpcodeInfo, OPCODE_TABLE};
pub use program::{
    Program, RelocationInfo, RelocationMode, Segment, SparseBinaryCode, SymbolInfo, ValueAlias,
};

use thiserror::Error;

/// Errors surfaced by the CPU interpreter.
///
/// Every variant carries the program counter context a debugger needs.
/// `Halted` is the normal end of a test-style run: BRK was reached with no
/// interrupt handler model installed, and the final register file is
/// attached for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Fetched an opcode byte with no documented encoding.
    #[error("illegal opcode {opcode:#04x} at {pc:#06x}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// A memory access hit an unmapped address.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// BRK reached; execution stopped after the full interrupt entry
    /// sequence.
    #[error("CPU halted at {pc:#06x}")]
    Halted { pc: u16, registers: Registers },

    /// Wall-clock budget exhausted between instructions.
    #[error("execution timed out after {cycles} cycles")]
    Timeout { cycles: u64 },
}
