//! Run-loop tests: BRK halt semantics, timeouts, and error propagation
//! out of `execute_with_timeout`.

use std::time::Duration;

use emu6502::{Clock, Cpu, ExecutionError, Memory16, Ram};

#[test]
fn test_brk_halts_with_register_file() {
    let clock = Clock::new();
    let mut memory = Ram::new(&clock);
    // LDA #$5A; BRK
    memory.write_bulk(0x2000, &[0xA9, 0x5A, 0x00]).unwrap();
    memory.write_bulk(0xFFFE, &[0x00, 0x30]).unwrap(); // IRQ vector
    let mut cpu = Cpu::new(&mut memory, &clock);
    cpu.reg.program_counter = 0x2000;

    let err = cpu
        .execute_with_timeout(Duration::from_secs(1))
        .unwrap_err();

    match err {
        ExecutionError::Halted { pc, registers } => {
            assert_eq!(pc, 0x2002);
            assert_eq!(registers.a, 0x5A);
            assert!(registers.flag_i, "BRK sets interrupt disable");
            // PC followed the IRQ vector before halting
            assert_eq!(registers.program_counter, 0x3000);
        }
        other => panic!("expected halt, got {other:?}"),
    }
}

#[test]
fn test_brk_pushes_pc_plus_two_and_status() {
    let clock = Clock::new();
    let mut memory = Ram::new(&clock);
    memory.write_bulk(0x2000, &[0x00]).unwrap(); // BRK
    let mut cpu = Cpu::new(&mut memory, &clock);
    cpu.reg.program_counter = 0x2000;
    cpu.reg.stack_pointer = 0xFF;
    cpu.reg.flag_c = true;

    let err = cpu.execute_next_instruction().unwrap_err();
    assert!(matches!(err, ExecutionError::Halted { .. }));
    assert_eq!(cpu.reg.stack_pointer, 0xFC);
    assert_eq!(clock.current_cycle(), 7);

    drop(cpu);
    // Return address 0x2002 (hi, lo) then status with B and bit 5 set
    assert_eq!(memory.read_range(0x01FF, 1).unwrap(), vec![0x20]);
    assert_eq!(memory.read_range(0x01FE, 1).unwrap(), vec![0x02]);
    let status = memory.read_range(0x01FD, 1).unwrap()[0];
    assert_eq!(status & 0b0011_0000, 0b0011_0000);
    assert_eq!(status & 0b0000_0001, 0b0000_0001);
}

#[test]
fn test_timeout_fires_between_instructions() {
    let clock = Clock::new();
    let mut memory = Ram::new(&clock);
    // Tight loop: JMP $2000
    memory.write_bulk(0x2000, &[0x4C, 0x00, 0x20]).unwrap();
    let mut cpu = Cpu::new(&mut memory, &clock);
    cpu.reg.program_counter = 0x2000;

    let err = cpu
        .execute_with_timeout(Duration::from_millis(20))
        .unwrap_err();

    match err {
        ExecutionError::Timeout { cycles } => {
            // Whole instructions only: the cycle count is a multiple of
            // the 3-cycle JMP
            assert!(cycles > 0);
            assert_eq!(cycles % 3, 0);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    // PC observable at an instruction boundary
    assert_eq!(cpu.reg.program_counter, 0x2000);
}

#[test]
fn test_zero_budget_times_out_immediately() {
    let clock = Clock::new();
    let mut memory = Ram::new(&clock);
    let mut cpu = Cpu::new(&mut memory, &clock);

    let err = cpu.execute_with_timeout(Duration::ZERO).unwrap_err();
    assert_eq!(err, ExecutionError::Timeout { cycles: 0 });
}

#[test]
fn test_illegal_opcode_aborts_run() {
    let clock = Clock::new();
    let mut memory = Ram::new(&clock);
    memory.write_bulk(0x2000, &[0xEA, 0x02]).unwrap(); // NOP; illegal
    let mut cpu = Cpu::new(&mut memory, &clock);
    cpu.reg.program_counter = 0x2000;

    let err = cpu
        .execute_with_timeout(Duration::from_secs(1))
        .unwrap_err();
    assert_eq!(
        err,
        ExecutionError::IllegalOpcode {
            opcode: 0x02,
            pc: 0x2001
        }
    );
}

#[test]
fn test_assembled_program_runs_to_halt() {
    let program = emu6502::compile_str(
        ".org $0600\n\
         start:\n\
         LDX #$05\n\
         LDA #$00\n\
         loop:\n\
         CLC\n\
         ADC #$0A\n\
         DEX\n\
         BNE loop\n\
         STA $0200\n\
         BRK\n",
    )
    .unwrap();

    let clock = Clock::new();
    let mut memory = Ram::new(&clock);
    memory.write_sparse(&program.sparse_binary_code).unwrap();
    let mut cpu = Cpu::new(&mut memory, &clock);
    cpu.reg.program_counter = program.symbol_offset("start").unwrap();

    let err = cpu
        .execute_with_timeout(Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(err, ExecutionError::Halted { .. }));

    drop(cpu);
    // 5 * 10 accumulated
    assert_eq!(memory.read_range(0x0200, 1).unwrap(), vec![50]);
}
