//! Property-based tests for CPU invariants.

use emu6502::{Clock, Cpu, Memory16, Mnemonic, Ram, OPCODE_TABLE};
use proptest::prelude::*;

/// Opcodes that never redirect PC, so PC must advance by instruction size.
fn straight_line_opcodes() -> Vec<u8> {
    OPCODE_TABLE
        .iter()
        .filter(|info| {
            !info.mnemonic.is_branch()
                && !matches!(
                    info.mnemonic,
                    Mnemonic::Jmp | Mnemonic::Jsr | Mnemonic::Rts | Mnemonic::Rti | Mnemonic::Brk
                )
        })
        .map(|info| info.opcode)
        .collect()
}

/// Everything except BRK (which ends a run by design).
fn non_halting_opcodes() -> Vec<u8> {
    OPCODE_TABLE
        .iter()
        .filter(|info| info.mnemonic != Mnemonic::Brk)
        .map(|info| info.opcode)
        .collect()
}

proptest! {
    /// PC advances by exactly the table-declared size for straight-line
    /// instructions.
    #[test]
    fn prop_pc_advances_by_instruction_size(
        opcode in prop::sample::select(straight_line_opcodes()),
        operand_lo in any::<u8>(),
        operand_hi in any::<u8>(),
    ) {
        let clock = Clock::new();
        let mut memory = Ram::new(&clock);
        memory.write_bulk(0x8000, &[opcode, operand_lo, operand_hi]).unwrap();
        let mut cpu = Cpu::new(&mut memory, &clock);
        cpu.reg.program_counter = 0x8000;

        cpu.execute_next_instruction().unwrap();

        let size = OPCODE_TABLE
            .iter()
            .find(|info| info.opcode == opcode)
            .unwrap()
            .size;
        prop_assert_eq!(cpu.reg.program_counter, 0x8000 + u16::from(size));
    }

    /// Identical initial state gives identical register files, memory and
    /// cycle counts.
    #[test]
    fn prop_execution_is_deterministic(
        opcode in prop::sample::select(non_halting_opcodes()),
        operand_lo in any::<u8>(),
        operand_hi in any::<u8>(),
        a in any::<u8>(),
        x in any::<u8>(),
        y in any::<u8>(),
    ) {
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let clock = Clock::new();
            let mut memory = Ram::new(&clock);
            memory.write_bulk(0x8000, &[opcode, operand_lo, operand_hi]).unwrap();
            let mut cpu = Cpu::new(&mut memory, &clock);
            cpu.reg.program_counter = 0x8000;
            cpu.reg.a = a;
            cpu.reg.x = x;
            cpu.reg.y = y;

            let result = cpu.execute_next_instruction();
            prop_assert!(result.is_ok(), "{:?}", result);

            let registers = cpu.reg;
            let cycles = clock.current_cycle();
            drop(cpu);
            let snapshot = memory.read_range(0x0000, 0x0400).unwrap();
            outcomes.push((registers, cycles, snapshot));
        }
        prop_assert_eq!(&outcomes[0], &outcomes[1]);
    }

    /// The cycle count of a straight-line instruction is never below the
    /// table's base cost, and exceeds it by at most the one-cycle page
    /// penalty.
    #[test]
    fn prop_cycles_within_declared_bounds(
        opcode in prop::sample::select(straight_line_opcodes()),
        operand_lo in any::<u8>(),
        operand_hi in any::<u8>(),
        x in any::<u8>(),
        y in any::<u8>(),
    ) {
        let clock = Clock::new();
        let mut memory = Ram::new(&clock);
        memory.write_bulk(0x8000, &[opcode, operand_lo, operand_hi]).unwrap();
        let mut cpu = Cpu::new(&mut memory, &clock);
        cpu.reg.program_counter = 0x8000;
        cpu.reg.x = x;
        cpu.reg.y = y;

        cpu.execute_next_instruction().unwrap();

        let info = OPCODE_TABLE.iter().find(|i| i.opcode == opcode).unwrap();
        let cycles = clock.current_cycle();
        let max = u64::from(info.base_cycles) + u64::from(info.page_cross_penalty);
        prop_assert!(cycles >= u64::from(info.base_cycles), "{} below base", cycles);
        prop_assert!(cycles <= max, "{} above {}", cycles, max);
    }
}
