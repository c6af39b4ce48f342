//! Instruction argument parsing and addressing-mode selection.
//!
//! [`parse_argument`] maps an operand token sequence to the set of
//! addressing modes it could syntactically represent plus the decoded
//! value. [`select_mode`] then intersects those candidates with the modes
//! an instruction actually supports. Both are pure functions so the whole
//! disambiguation pipeline is unit-testable without an assembler around it.

use thiserror::Error;

use crate::addressing::AddressMode;
use crate::assembler::tokenizer::Token;

/// Malformed operand syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("malformed instruction argument")]
    Malformed,

    #[error("index register must be X or Y")]
    BadIndexRegister,

    #[error("immediate operand must be a single byte")]
    ImmediateTooWide,
}

/// Mode selection failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeSelectError {
    #[error("opcode does not accept this addressing form")]
    NoMatchingMode,

    #[error("ambiguous addressing form")]
    Ambiguous,
}

/// The decoded operand payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    /// No operand (implied and accumulator instructions).
    None,

    /// Literal bytes, little-endian, at the operand's written width.
    Bytes(Vec<u8>),

    /// Reference to a symbol to be resolved by the compilation context.
    SymbolRef(String),
}

/// An operand with every addressing mode it could syntactically be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionArgument {
    pub possible_modes: Vec<AddressMode>,
    pub value: ArgumentValue,
}

impl InstructionArgument {
    fn new(possible_modes: Vec<AddressMode>, value: ArgumentValue) -> Self {
        Self { possible_modes, value }
    }
}

enum IndexRegister {
    X,
    Y,
}

fn index_register(name: &str) -> Result<IndexRegister, ArgumentError> {
    if name.eq_ignore_ascii_case("X") {
        Ok(IndexRegister::X)
    } else if name.eq_ignore_ascii_case("Y") {
        Ok(IndexRegister::Y)
    } else {
        Err(ArgumentError::BadIndexRegister)
    }
}

/// Parse an instruction's operand tokens into candidate modes and a value.
///
/// Recognized forms:
///
/// | Syntax | Candidate modes |
/// |---|---|
/// | (none) | Implied, Accumulator |
/// | `A` | Accumulator |
/// | `#val` | Immediate |
/// | `num8` | ZeroPage |
/// | `num16` | Absolute, Relative |
/// | `num8,X` / `num8,Y` | ZeroPageX + AbsoluteX / ZeroPageY + AbsoluteY |
/// | `num16,X` / `num16,Y` | AbsoluteX / AbsoluteY |
/// | `(num8,X)` | IndirectX |
/// | `(num8),Y` | IndirectY |
/// | `(num16)` | Indirect |
/// | `ident` | Absolute, Relative, ZeroPage |
/// | `ident,X` / `ident,Y` | AbsoluteX / AbsoluteY |
pub fn parse_argument(tokens: &[Token]) -> Result<InstructionArgument, ArgumentError> {
    use AddressMode::*;

    let argument = match tokens {
        [] => InstructionArgument::new(vec![Implied, Accumulator], ArgumentValue::None),

        [Token::Ident(name)] if name.eq_ignore_ascii_case("A") => {
            InstructionArgument::new(vec![Accumulator], ArgumentValue::None)
        }

        [Token::Hash, Token::Number(literal)] => {
            if literal.width != 1 {
                return Err(ArgumentError::ImmediateTooWide);
            }
            InstructionArgument::new(vec![Immediate], ArgumentValue::Bytes(literal.to_bytes()))
        }

        // Immediate alias reference, resolved by the context
        [Token::Hash, Token::Ident(name)] => {
            InstructionArgument::new(vec![Immediate], ArgumentValue::SymbolRef(name.clone()))
        }

        [Token::Number(literal)] => {
            let modes = if literal.width == 1 {
                vec![ZeroPage]
            } else {
                vec![Absolute, Relative]
            };
            InstructionArgument::new(modes, ArgumentValue::Bytes(literal.to_bytes()))
        }

        [Token::Number(literal), Token::Comma, Token::Ident(register)] => {
            let modes = match (index_register(register)?, literal.width) {
                (IndexRegister::X, 1) => vec![ZeroPageX, AbsoluteX],
                (IndexRegister::X, _) => vec![AbsoluteX],
                (IndexRegister::Y, 1) => vec![ZeroPageY, AbsoluteY],
                (IndexRegister::Y, _) => vec![AbsoluteY],
            };
            InstructionArgument::new(modes, ArgumentValue::Bytes(literal.to_bytes()))
        }

        [Token::LParen, Token::Number(literal), Token::Comma, Token::Ident(register), Token::RParen] => {
            match index_register(register)? {
                IndexRegister::X if literal.width == 1 => {
                    InstructionArgument::new(vec![IndirectX], ArgumentValue::Bytes(literal.to_bytes()))
                }
                _ => return Err(ArgumentError::Malformed),
            }
        }

        [Token::LParen, Token::Number(literal), Token::RParen, Token::Comma, Token::Ident(register)] => {
            match index_register(register)? {
                IndexRegister::Y if literal.width == 1 => {
                    InstructionArgument::new(vec![IndirectY], ArgumentValue::Bytes(literal.to_bytes()))
                }
                _ => return Err(ArgumentError::Malformed),
            }
        }

        [Token::LParen, Token::Number(literal), Token::RParen] => {
            InstructionArgument::new(vec![Indirect], ArgumentValue::Bytes(literal.to_bytes()))
        }

        [Token::Ident(name)] => InstructionArgument::new(
            vec![Absolute, Relative, ZeroPage],
            ArgumentValue::SymbolRef(name.clone()),
        ),

        [Token::Ident(name), Token::Comma, Token::Ident(register)] => {
            let mode = match index_register(register)? {
                IndexRegister::X => AbsoluteX,
                IndexRegister::Y => AbsoluteY,
            };
            InstructionArgument::new(vec![mode], ArgumentValue::SymbolRef(name.clone()))
        }

        _ => return Err(ArgumentError::Malformed),
    };
    Ok(argument)
}

/// Pick the addressing mode for an argument given the modes an instruction
/// supports.
///
/// `zero_page_symbol` reports whether a symbol operand is already known to
/// live in the zero page; only then may a symbol select the one-byte
/// ZeroPage encoding. Indexed zero-page modes accept numeric operands only,
/// so they are always stripped for symbols.
pub fn select_mode(
    supported: &[AddressMode],
    argument: &InstructionArgument,
    zero_page_symbol: bool,
) -> Result<AddressMode, ModeSelectError> {
    use AddressMode::*;

    let mut candidates: Vec<AddressMode> = argument
        .possible_modes
        .iter()
        .copied()
        .filter(|mode| supported.contains(mode))
        .collect();

    if let ArgumentValue::SymbolRef(_) = argument.value {
        candidates.retain(|mode| match mode {
            ZeroPageX | ZeroPageY => false,
            ZeroPage => zero_page_symbol,
            _ => true,
        });
        // A zero-page symbol may still assemble absolutely; prefer the
        // short form when both remain
        if zero_page_symbol && candidates.contains(&ZeroPage) {
            candidates.retain(|mode| *mode == ZeroPage);
        }
    }

    match candidates.as_slice() {
        [] => Err(ModeSelectError::NoMatchingMode),
        [mode] => Ok(*mode),
        _ => {
            if let ArgumentValue::Bytes(bytes) = &argument.value {
                // A one-byte literal picks the zero-page flavor of an
                // indexed pair; a two-byte literal the absolute one
                let prefer_zero_page = bytes.len() == 1;
                let narrowed: Vec<AddressMode> = candidates
                    .iter()
                    .copied()
                    .filter(|mode| {
                        let is_zp = matches!(mode, ZeroPage | ZeroPageX | ZeroPageY);
                        is_zp == prefer_zero_page
                    })
                    .collect();
                if let [mode] = narrowed.as_slice() {
                    return Ok(*mode);
                }
            }
            if let ArgumentValue::SymbolRef(_) = argument.value {
                // Conservative default: assume a two-byte address
                if candidates.contains(&Absolute) {
                    return Ok(Absolute);
                }
            }
            Err(ModeSelectError::Ambiguous)
        }
    }
}
