//! # 6502 Assembler
//!
//! Two-pass-equivalent symbolic assembler: one forward walk over the
//! source with back-patching of forward references, producing a
//! [`Program`] — sparse binary image plus symbol, alias and relocation
//! tables.
//!
//! ```
//! use emu6502::assembler::compile_str;
//!
//! let program = compile_str(
//!     ".org $2000\n\
//!      start:\n\
//!      LDA #$00\n\
//!      BNE start\n",
//! )
//! .unwrap();
//!
//! assert_eq!(program.sparse_binary_code.get(0x2000), Some(0xA9));
//! assert_eq!(program.symbol_offset("start"), Some(0x2000));
//! ```

pub mod argument;
pub mod context;
pub mod tokenizer;

pub use argument::{ArgumentError, ArgumentValue, InstructionArgument, ModeSelectError};
pub use context::CompilationContext;
pub use tokenizer::{LexError, LineTokenizer, NumericLiteral, Token};

use thiserror::Error;

use crate::opcodes::Mnemonic;
use crate::program::{OverwriteError, Program};

/// An assembler failure, attributed to the 1-indexed source line that
/// caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AssemblerError {
    pub line: usize,
    pub kind: AsmErrorKind,
}

/// What went wrong on a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("unknown directive '{0}'")]
    UnknownDirective(String),

    #[error("unknown segment '{0}'")]
    UnknownSegment(String),

    #[error("{mnemonic} does not accept this addressing form")]
    NoMatchingMode { mnemonic: Mnemonic },

    #[error("ambiguous addressing form for {mnemonic}")]
    AmbiguousMode { mnemonic: Mnemonic },

    #[error("symbol '{0}' is already defined")]
    SymbolRedefined(String),

    #[error("alias '{0}' is already defined")]
    AliasRedefined(String),

    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),

    #[error("undefined alias '{0}'")]
    UndefinedAlias(String),

    #[error("branch from {from:#06x} to {target:#06x} is out of range")]
    BranchOutOfRange { from: u16, target: u16 },

    #[error("zero-page operand {target:#06x} has a non-zero high byte")]
    ZeroPageOutOfRange { target: u16 },

    #[error("value {value:#06x} does not fit in one byte")]
    ValueTooWide { value: u16 },

    #[error(transparent)]
    Emit(#[from] OverwriteError),

    #[error("expected {0}")]
    Expected(&'static str),
}

/// Assemble a complete source text into a [`Program`].
///
/// Lines are independent; the first error aborts compilation. After the
/// last line, any symbol that was referenced but never defined is an
/// error.
pub fn compile_str(source: &str) -> Result<Program, AssemblerError> {
    let mut context = CompilationContext::new();
    for (index, line) in source.lines().enumerate() {
        context.process_line(line, index + 1)?;
    }
    context.finish()
}
