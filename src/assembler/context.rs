//! The compilation context: per-line driver of the assembler.
//!
//! A [`CompilationContext`] walks token streams line by line, maintaining
//! the current emission address and segment, defining and patching symbols,
//! and recording relocations into the growing [`Program`]. The first error
//! aborts compilation.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::addressing::AddressMode;
use crate::assembler::argument::{
    parse_argument, select_mode, ArgumentValue, ModeSelectError,
};
use crate::assembler::tokenizer::{tokenize_line, NumericLiteral, Token};
use crate::assembler::{AsmErrorKind, AssemblerError};
use crate::opcodes::{self, Mnemonic};
use crate::program::{
    relative_jump_offset, Program, RelocationInfo, RelocationMode, Segment, SymbolInfo,
    ValueAlias,
};

/// Assembler state threaded through every source line.
pub struct CompilationContext {
    current_address: u16,
    current_segment: Segment,
    program: Program,
    line: usize,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self {
            current_address: 0,
            current_segment: Segment::Unknown,
            program: Program::new(),
            line: 0,
        }
    }

    /// Current emission address.
    pub fn current_address(&self) -> u16 {
        self.current_address
    }

    fn err(&self, kind: AsmErrorKind) -> AssemblerError {
        AssemblerError { line: self.line, kind }
    }

    /// Process one source line: optional labels, then a directive or an
    /// instruction.
    pub fn process_line(&mut self, text: &str, line_number: usize) -> Result<(), AssemblerError> {
        self.line = line_number;
        let tokens = tokenize_line(text).map_err(|e| self.err(e.into()))?;
        let mut rest: &[Token] = &tokens;

        while let [Token::Ident(name), Token::Colon, ..] = rest {
            if name.starts_with('.') {
                break;
            }
            let name = name.clone();
            self.define_symbol(&name)?;
            rest = &rest[2..];
        }

        let [Token::Ident(head), args @ ..] = rest else {
            if rest.is_empty() {
                return Ok(());
            }
            return Err(self.err(AsmErrorKind::Expected("a mnemonic or directive")));
        };

        let bare = head.strip_prefix('.').unwrap_or(head);
        match bare.to_ascii_lowercase().as_str() {
            "org" => self.directive_org(args),
            "byte" => self.directive_byte(args),
            "word" => self.directive_word(args),
            "text" => self.directive_text(args),
            "alias" => self.directive_alias(args),
            "segment" => self.directive_segment(args),
            _ => {
                if head.starts_with('.') {
                    Err(self.err(AsmErrorKind::UnknownDirective(head.clone())))
                } else if let Some(mnemonic) = Mnemonic::parse(head) {
                    self.emit_instruction(mnemonic, args)
                } else {
                    Err(self.err(AsmErrorKind::UnknownMnemonic(head.clone())))
                }
            }
        }
    }

    /// Final pass: every referenced symbol must have been defined.
    pub fn finish(self) -> Result<Program, AssemblerError> {
        let mut undefined: Option<(usize, String)> = None;
        for (name, symbol) in &self.program.symbols {
            let symbol = symbol.borrow();
            if symbol.offset.is_none()
                && undefined.as_ref().map_or(true, |(line, _)| symbol.line < *line)
            {
                undefined = Some((symbol.line, name.clone()));
            }
        }
        if let Some((line, name)) = undefined {
            return Err(AssemblerError {
                line,
                kind: AsmErrorKind::UndefinedSymbol(name),
            });
        }
        Ok(self.program)
    }

    // ========== Directives ==========

    fn directive_org(&mut self, args: &[Token]) -> Result<(), AssemblerError> {
        let [Token::Number(literal)] = args else {
            return Err(self.err(AsmErrorKind::Expected("an address after 'org'")));
        };
        debug!(
            "moving cursor {:04x} -> {:04x}",
            self.current_address, literal.value
        );
        self.current_address = literal.value;
        Ok(())
    }

    fn directive_byte(&mut self, args: &[Token]) -> Result<(), AssemblerError> {
        for item in split_on_commas(args) {
            match item {
                [Token::Number(literal)] => {
                    let value = literal.value;
                    if value > 0xFF {
                        return Err(self.err(AsmErrorKind::ValueTooWide { value }));
                    }
                    self.emit_bytes(&[value as u8])?;
                }
                [Token::Ident(name)] => {
                    let alias = self
                        .program
                        .find_alias(name)
                        .ok_or_else(|| self.err(AsmErrorKind::UndefinedAlias(name.clone())))?;
                    self.emit_bytes(&alias.value.clone())?;
                }
                _ => return Err(self.err(AsmErrorKind::Expected("a byte value"))),
            }
        }
        Ok(())
    }

    fn directive_word(&mut self, args: &[Token]) -> Result<(), AssemblerError> {
        for item in split_on_commas(args) {
            match item {
                [Token::Number(literal)] => {
                    self.emit_bytes(&literal.value.to_le_bytes())?;
                }
                [Token::Ident(name)] => {
                    let alias = self
                        .program
                        .find_alias(name)
                        .ok_or_else(|| self.err(AsmErrorKind::UndefinedAlias(name.clone())))?;
                    let word = match alias.value.as_slice() {
                        [lo] => [*lo, 0],
                        [lo, hi] => [*lo, *hi],
                        _ => return Err(self.err(AsmErrorKind::Expected("a 16-bit value"))),
                    };
                    self.emit_bytes(&word)?;
                }
                _ => return Err(self.err(AsmErrorKind::Expected("a 16-bit value"))),
            }
        }
        Ok(())
    }

    fn directive_text(&mut self, args: &[Token]) -> Result<(), AssemblerError> {
        let [Token::Str(text)] = args else {
            return Err(self.err(AsmErrorKind::Expected("a string literal after 'text'")));
        };
        self.emit_bytes(&text.clone().into_bytes())
    }

    fn directive_alias(&mut self, args: &[Token]) -> Result<(), AssemblerError> {
        let [Token::Ident(name), Token::Equal, Token::Number(literal)] = args else {
            return Err(self.err(AsmErrorKind::Expected("'name = value' after 'alias'")));
        };
        if self.program.find_alias(name).is_some() {
            return Err(self.err(AsmErrorKind::AliasRedefined(name.clone())));
        }
        debug!("alias '{}' = {:?}", name, literal.to_bytes());
        self.program.add_alias(ValueAlias {
            name: name.clone(),
            value: literal.to_bytes(),
        });
        Ok(())
    }

    fn directive_segment(&mut self, args: &[Token]) -> Result<(), AssemblerError> {
        let [Token::Ident(name)] = args else {
            return Err(self.err(AsmErrorKind::Expected("a segment name")));
        };
        self.current_segment = match name.to_ascii_lowercase().as_str() {
            "zeropage" | "zp" => Segment::ZeroPage,
            "code" | "text" => Segment::Code,
            "data" => Segment::Data,
            "rodata" => Segment::RoData,
            "absolute" => Segment::AbsoluteAddress,
            _ => return Err(self.err(AsmErrorKind::UnknownSegment(name.clone()))),
        };
        Ok(())
    }

    // ========== Symbols ==========

    /// Define `name` at the current address. Re-defining a defined symbol
    /// is an error; defining a forward reference triggers back-patching.
    fn define_symbol(&mut self, name: &str) -> Result<(), AssemblerError> {
        match self.program.find_symbol(name) {
            None => {
                debug!("defining symbol '{}' at {:04x}", name, self.current_address);
                self.program.add_symbol(SymbolInfo {
                    name: name.to_string(),
                    offset: Some(self.current_address),
                    imported: false,
                    segment: self.current_segment,
                    line: self.line,
                    references: Vec::new(),
                });
                Ok(())
            }
            Some(symbol) => {
                {
                    let mut sym = symbol.borrow_mut();
                    if sym.offset.is_some() {
                        return Err(self.err(AsmErrorKind::SymbolRedefined(name.to_string())));
                    }
                    debug!("resolving symbol '{}' to {:04x}", name, self.current_address);
                    sym.offset = Some(self.current_address);
                    sym.imported = false;
                    sym.segment = self.current_segment;
                    sym.line = self.line;
                }
                self.back_patch(&symbol)
            }
        }
    }

    /// Rewrite every pending reference of a freshly defined symbol.
    fn back_patch(&mut self, symbol: &Rc<RefCell<SymbolInfo>>) -> Result<(), AssemblerError> {
        let (target, references) = {
            let sym = symbol.borrow();
            let Some(target) = sym.offset else {
                return Ok(());
            };
            (target, sym.references.clone())
        };

        for weak in references {
            let Some(relocation) = weak.upgrade() else {
                continue;
            };
            debug!(
                "patching {:?} reference at {:04x} -> {:04x}",
                relocation.mode, relocation.position, target
            );
            match relocation.mode {
                RelocationMode::Absolute => self
                    .program
                    .sparse_binary_code
                    .put_bytes(relocation.position, &target.to_le_bytes(), true)
                    .map_err(|e| self.err(e.into()))?,
                RelocationMode::Relative => {
                    let offset = relative_jump_offset(relocation.position.wrapping_add(1), target)
                        .ok_or_else(|| {
                            self.err(AsmErrorKind::BranchOutOfRange {
                                from: relocation.position,
                                target,
                            })
                        })?;
                    self.program
                        .sparse_binary_code
                        .put_bytes(relocation.position, &[offset as u8], true)
                        .map_err(|e| self.err(e.into()))?;
                }
                RelocationMode::ZeroPage => {
                    if target > 0xFF {
                        return Err(self.err(AsmErrorKind::ZeroPageOutOfRange { target }));
                    }
                    self.program
                        .sparse_binary_code
                        .put_bytes(relocation.position, &[target as u8], true)
                        .map_err(|e| self.err(e.into()))?;
                }
            }
        }
        Ok(())
    }

    // ========== Instruction emission ==========

    fn emit_instruction(
        &mut self,
        mnemonic: Mnemonic,
        args: &[Token],
    ) -> Result<(), AssemblerError> {
        let args = self.substitute_aliases(args)?;
        let argument = parse_argument(&args).map_err(|e| self.err(e.into()))?;

        let zero_page_symbol = match &argument.value {
            ArgumentValue::SymbolRef(name) => self
                .program
                .find_symbol(name)
                .is_some_and(|s| s.borrow().segment == Segment::ZeroPage),
            _ => false,
        };

        let supported: Vec<AddressMode> = opcodes::variants_of(mnemonic)
            .iter()
            .map(|info| info.mode)
            .collect();
        let mode =
            select_mode(&supported, &argument, zero_page_symbol).map_err(|e| match e {
                ModeSelectError::NoMatchingMode => {
                    self.err(AsmErrorKind::NoMatchingMode { mnemonic })
                }
                ModeSelectError::Ambiguous => self.err(AsmErrorKind::AmbiguousMode { mnemonic }),
            })?;
        let Some(info) = opcodes::lookup(mnemonic, mode) else {
            unreachable!("selected mode comes from the instruction's variants");
        };

        self.emit_bytes(&[info.opcode])?;
        match argument.value {
            ArgumentValue::None => Ok(()),
            ArgumentValue::Bytes(bytes) => self.emit_numeric_operand(mode, bytes),
            ArgumentValue::SymbolRef(name) => self.emit_symbol_operand(mode, &name),
        }
    }

    /// Replace alias names with their numeric value before argument
    /// parsing. Substitution is textual: the alias behaves exactly as if
    /// its value had been written in the source.
    fn substitute_aliases(&self, tokens: &[Token]) -> Result<Vec<Token>, AssemblerError> {
        tokens
            .iter()
            .map(|token| match token {
                Token::Ident(name)
                    if !name.eq_ignore_ascii_case("A")
                        && !name.eq_ignore_ascii_case("X")
                        && !name.eq_ignore_ascii_case("Y") =>
                {
                    match self.program.find_alias(name) {
                        Some(alias) => {
                            let literal = match alias.value.as_slice() {
                                [lo] => NumericLiteral {
                                    value: u16::from(*lo),
                                    width: 1,
                                },
                                [lo, hi] => NumericLiteral {
                                    value: u16::from_le_bytes([*lo, *hi]),
                                    width: 2,
                                },
                                _ => {
                                    return Err(
                                        self.err(AsmErrorKind::Expected("a numeric alias value"))
                                    )
                                }
                            };
                            Ok(Token::Number(literal))
                        }
                        None => Ok(token.clone()),
                    }
                }
                other => Ok(other.clone()),
            })
            .collect()
    }

    fn emit_numeric_operand(
        &mut self,
        mode: AddressMode,
        bytes: Vec<u8>,
    ) -> Result<(), AssemblerError> {
        if mode == AddressMode::Relative {
            // A numeric branch operand is a target address, not an offset
            let target = match bytes.as_slice() {
                [lo] => u16::from(*lo),
                [lo, hi] => u16::from_le_bytes([*lo, *hi]),
                _ => return Err(self.err(AsmErrorKind::Expected("a branch target"))),
            };
            let position = self.current_address;
            let offset = relative_jump_offset(position.wrapping_add(1), target).ok_or_else(
                || {
                    self.err(AsmErrorKind::BranchOutOfRange {
                        from: position,
                        target,
                    })
                },
            )?;
            return self.emit_bytes(&[offset as u8]);
        }

        let operand_size = usize::from(mode.operand_size());
        let mut operand = bytes;
        debug_assert!(operand.len() <= operand_size);
        operand.resize(operand_size, 0);
        self.emit_bytes(&operand)
    }

    /// Emit a symbol operand: record a relocation, then either final bytes
    /// (symbol already defined) or a zero placeholder to be back-patched.
    fn emit_symbol_operand(
        &mut self,
        mode: AddressMode,
        name: &str,
    ) -> Result<(), AssemblerError> {
        if mode == AddressMode::Immediate {
            // Only aliases may appear in immediate operands, and those were
            // substituted before parsing
            return Err(self.err(AsmErrorKind::UndefinedAlias(name.to_string())));
        }
        let relocation_mode = match mode {
            AddressMode::Relative => RelocationMode::Relative,
            AddressMode::ZeroPage => RelocationMode::ZeroPage,
            _ => RelocationMode::Absolute,
        };
        let position = self.current_address;

        let symbol = match self.program.find_symbol(name) {
            Some(symbol) => symbol,
            None => {
                debug!("forward reference to '{}' at {:04x}", name, position);
                self.program.add_symbol(SymbolInfo {
                    name: name.to_string(),
                    offset: None,
                    imported: true,
                    segment: Segment::Unknown,
                    line: self.line,
                    references: Vec::new(),
                })
            }
        };

        let relocation = Rc::new(RelocationInfo {
            target_symbol: Rc::downgrade(&symbol),
            position,
            mode: relocation_mode,
        });
        symbol.borrow_mut().references.push(Rc::downgrade(&relocation));
        self.program.relocations.insert(relocation);

        let target = symbol.borrow().offset;
        let operand: Vec<u8> = match (relocation_mode, target) {
            (RelocationMode::Absolute, Some(target)) => target.to_le_bytes().to_vec(),
            (RelocationMode::Absolute, None) => vec![0, 0],
            (RelocationMode::Relative, Some(target)) => {
                let offset = relative_jump_offset(position.wrapping_add(1), target)
                    .ok_or_else(|| {
                        self.err(AsmErrorKind::BranchOutOfRange {
                            from: position,
                            target,
                        })
                    })?;
                vec![offset as u8]
            }
            (RelocationMode::Relative, None) => vec![0],
            (RelocationMode::ZeroPage, Some(target)) => {
                if target > 0xFF {
                    return Err(self.err(AsmErrorKind::ZeroPageOutOfRange { target }));
                }
                vec![target as u8]
            }
            (RelocationMode::ZeroPage, None) => vec![0],
        };
        self.emit_bytes(&operand)
    }

    fn emit_bytes(&mut self, bytes: &[u8]) -> Result<(), AssemblerError> {
        self.program
            .sparse_binary_code
            .put_bytes(self.current_address, bytes, false)
            .map_err(|e| self.err(e.into()))?;
        self.current_address = self.current_address.wrapping_add(bytes.len() as u16);
        Ok(())
    }
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a token slice on top-level commas.
fn split_on_commas(tokens: &[Token]) -> impl Iterator<Item = &[Token]> {
    tokens.split(|token| *token == Token::Comma)
}
