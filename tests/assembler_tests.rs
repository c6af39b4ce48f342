//! Encoding tests for the assembler: instruction bytes, directives,
//! aliases and error reporting.

use emu6502::assembler::{compile_str, AsmErrorKind};
use emu6502::Program;

fn assemble(source: &str) -> Program {
    compile_str(source).unwrap_or_else(|e| panic!("assembly failed: {e}"))
}

fn bytes_at(program: &Program, address: u16, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| {
            program
                .sparse_binary_code
                .get(address + i as u16)
                .unwrap_or_else(|| panic!("no byte at {:#06x}", address + i as u16))
        })
        .collect()
}

#[test]
fn test_lda_immediate_encoding() {
    let program = assemble("LDA #$00");
    assert_eq!(bytes_at(&program, 0, 2), vec![0xA9, 0x00]);
    assert_eq!(program.sparse_binary_code.len(), 2);
}

#[test]
fn test_sta_zero_page_encoding() {
    let program = assemble("STA $42");
    assert_eq!(bytes_at(&program, 0, 2), vec![0x85, 0x42]);
}

#[test]
fn test_mode_disambiguation_by_literal_width() {
    // One-byte literal selects zero page, two-byte absolute
    let program = assemble("LDA $10\nLDA $0010\nLDA $10,X\nLDA $1234,X");
    assert_eq!(
        bytes_at(&program, 0, 10),
        vec![0xA5, 0x10, 0xAD, 0x10, 0x00, 0xB5, 0x10, 0xBD, 0x34, 0x12]
    );
}

#[test]
fn test_indirect_encodings() {
    let program = assemble("LDA ($40,X)\nLDA ($40),Y\nJMP ($1234)");
    assert_eq!(
        bytes_at(&program, 0, 7),
        vec![0xA1, 0x40, 0xB1, 0x40, 0x6C, 0x34, 0x12]
    );
}

#[test]
fn test_accumulator_and_implied_forms() {
    let program = assemble("ASL\nASL A\nLSR\nNOP");
    assert_eq!(bytes_at(&program, 0, 4), vec![0x0A, 0x0A, 0x4A, 0xEA]);
}

#[test]
fn test_case_insensitive_mnemonics_and_directives() {
    let program = assemble(".ORG $1000\nlda #$01\nLdA #$02");
    assert_eq!(bytes_at(&program, 0x1000, 4), vec![0xA9, 0x01, 0xA9, 0x02]);
}

#[test]
fn test_org_and_byte_word_directives() {
    let program = assemble(
        ".org $2000\n\
         .byte $11, $22, 51\n\
         .word $ABCD, $0010\n",
    );
    assert_eq!(
        bytes_at(&program, 0x2000, 7),
        vec![0x11, 0x22, 51, 0xCD, 0xAB, 0x10, 0x00]
    );
}

#[test]
fn test_directive_without_leading_dot() {
    let program = assemble("org $3000\nbyte $AA\n");
    assert_eq!(bytes_at(&program, 0x3000, 1), vec![0xAA]);
}

#[test]
fn test_text_directive() {
    let program = assemble(".org $0200\n.text \"HI!\"");
    assert_eq!(bytes_at(&program, 0x0200, 3), b"HI!".to_vec());
}

#[test]
fn test_alias_substitution() {
    let program = assemble(
        ".alias MAGIC = $42\n\
         .alias TABLE = $1234\n\
         LDA #MAGIC\n\
         LDA MAGIC\n\
         LDA TABLE\n\
         .byte MAGIC\n",
    );
    // #MAGIC -> immediate, MAGIC -> zero page (one byte wide),
    // TABLE -> absolute (two bytes wide)
    assert_eq!(
        bytes_at(&program, 0, 8),
        vec![0xA9, 0x42, 0xA5, 0x42, 0xAD, 0x34, 0x12, 0x42]
    );
    assert_eq!(program.find_alias("MAGIC").unwrap().value, vec![0x42]);
}

#[test]
fn test_labels_on_their_own_line_and_inline() {
    let program = assemble(
        ".org $1000\n\
         start:\n\
         here: LDA #$01\n",
    );
    assert_eq!(program.symbol_offset("start"), Some(0x1000));
    assert_eq!(program.symbol_offset("here"), Some(0x1000));
    assert_eq!(bytes_at(&program, 0x1000, 2), vec![0xA9, 0x01]);
}

#[test]
fn test_zero_page_segment_selects_short_form() {
    let program = assemble(
        ".segment zeropage\n\
         .org $0040\n\
         counter:\n\
         .byte 0\n\
         .segment code\n\
         .org $2000\n\
         LDA counter\n",
    );
    // counter lives in page zero, so the reference assembles as zero page
    assert_eq!(bytes_at(&program, 0x2000, 2), vec![0xA5, 0x40]);

    let symbol = program.find_symbol("counter").unwrap();
    assert_eq!(symbol.borrow().segment, emu6502::Segment::ZeroPage);
}

#[test]
fn test_numeric_branch_target() {
    let program = assemble(".org $1000\nBNE $1000\n");
    // Offset from 0x1002: 0x1000 - 0x1002 = -2
    assert_eq!(bytes_at(&program, 0x1000, 2), vec![0xD0, 0xFE]);
}

#[test]
fn test_comments_and_blank_lines_are_ignored() {
    let program = assemble(
        "; leading comment\n\
         \n\
         LDA #$01 ; trailing comment\n\
         \t\n",
    );
    assert_eq!(bytes_at(&program, 0, 2), vec![0xA9, 0x01]);
}

#[test]
fn test_every_documented_encoding_assembles() {
    use emu6502::AddressMode;

    for info in emu6502::OPCODE_TABLE.iter() {
        let operand = match info.mode {
            AddressMode::Implied => "",
            AddressMode::Accumulator => "A",
            AddressMode::Immediate => "#$12",
            AddressMode::ZeroPage => "$12",
            AddressMode::ZeroPageX => "$12,X",
            AddressMode::ZeroPageY => "$12,Y",
            AddressMode::Relative => "$0FF0",
            AddressMode::Absolute => "$1234",
            AddressMode::AbsoluteX => "$1234,X",
            AddressMode::AbsoluteY => "$1234,Y",
            AddressMode::Indirect => "($1234)",
            AddressMode::IndirectX => "($12,X)",
            AddressMode::IndirectY => "($12),Y",
        };
        let source = format!(".org $1000\n{} {}\n", info.mnemonic, operand);
        let program = compile_str(&source)
            .unwrap_or_else(|e| panic!("{} {:?}: {e}", info.mnemonic, info.mode));

        assert_eq!(
            program.sparse_binary_code.get(0x1000),
            Some(info.opcode),
            "{} {:?}",
            info.mnemonic,
            info.mode
        );
        assert_eq!(
            program.sparse_binary_code.len(),
            usize::from(info.size),
            "{} {:?}",
            info.mnemonic,
            info.mode
        );
    }
}

// ========== Error Cases ==========

#[test]
fn test_unknown_mnemonic_is_an_error() {
    let err = compile_str("XYZZY #$01").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(matches!(err.kind, AsmErrorKind::UnknownMnemonic(_)));
}

#[test]
fn test_unknown_directive_is_an_error() {
    let err = compile_str(".bogus 1").unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::UnknownDirective(_)));
}

#[test]
fn test_unsupported_addressing_form() {
    // JMP has no immediate form
    let err = compile_str("JMP #$10").unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::NoMatchingMode { .. }));
}

#[test]
fn test_byte_value_out_of_range() {
    let err = compile_str(".byte $1FF").unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::ValueTooWide { value: 0x1FF }));
}

#[test]
fn test_branch_out_of_range() {
    let err = compile_str(".org $1000\nBNE $2000\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(matches!(err.kind, AsmErrorKind::BranchOutOfRange { .. }));
}

#[test]
fn test_lex_error_carries_line_number() {
    let err = compile_str("NOP\nLDA $ZZ\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(matches!(err.kind, AsmErrorKind::Lex(_)));
}

#[test]
fn test_overlapping_emission_is_an_error() {
    let err = compile_str(
        ".org $1000\n\
         .byte 1, 2\n\
         .org $1001\n\
         .byte 3\n",
    )
    .unwrap_err();
    assert_eq!(err.line, 4);
    assert!(matches!(err.kind, AsmErrorKind::Emit(_)));
}

#[test]
fn test_undefined_alias_in_byte_directive() {
    let err = compile_str(".byte NOSUCH").unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::UndefinedAlias(_)));
}

#[test]
fn test_alias_redefinition_is_an_error() {
    let err = compile_str(".alias A1 = 1\n.alias A1 = 2\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(matches!(err.kind, AsmErrorKind::AliasRedefined(_)));
}
