//! # CPU State and Execution
//!
//! The [`Cpu`] owns nothing but its register file: it borrows the memory
//! bus and the clock for the duration of a run, and both must outlive it.
//! Cycle counts are never estimated — every single-byte memory access ticks
//! the shared clock, and instructions add explicit internal ticks where the
//! hardware spends cycles without touching the bus (index arithmetic,
//! read-modify-write dummy cycles, stack pointer adjustments).
//!
//! ## Execution Model
//!
//! - [`Cpu::execute_next_instruction`]: one fetch-decode-execute step
//! - [`Cpu::execute_with_timeout`]: run until BRK, an error, or a wall-clock
//!   budget is exhausted; the budget is checked only between instructions,
//!   so a partially executed instruction is never observable

use std::time::{Duration, Instant};

use crate::addressing::AddressMode;
use crate::clock::Clock;
use crate::memory::Memory16;
use crate::opcodes::{self, Mnemonic, OpcodeInfo};
use crate::ExecutionError;

/// 6502 register file.
///
/// The stack lives at `0x0100 + stack_pointer` and grows downward. Flags
/// are individual bools; [`Registers::status_byte`] packs them in NV1BDIZC
/// order for PHP/BRK pushes and [`Registers::set_status_byte`] unpacks for
/// PLP/RTI pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    /// Accumulator
    pub a: u8,

    /// X index register
    pub x: u8,

    /// Y index register
    pub y: u8,

    /// Stack pointer (offset into page 1)
    pub stack_pointer: u8,

    /// Address of the next instruction
    pub program_counter: u16,

    /// Negative: bit 7 of the last result
    pub flag_n: bool,

    /// Overflow: signed overflow of the last ADC/SBC, or bit 6 via BIT
    pub flag_v: bool,

    /// Break: only meaningful inside a pushed status byte
    pub flag_b: bool,

    /// Decimal mode: tracked via SED/CLD; arithmetic stays binary
    pub flag_d: bool,

    /// Interrupt disable
    pub flag_i: bool,

    /// Zero: last result was 0x00
    pub flag_z: bool,

    /// Carry
    pub flag_c: bool,
}

impl Registers {
    /// Pack the flags as NV1BDIZC. Bit 5 is always set.
    pub fn status_byte(&self) -> u8 {
        let mut status = 0b0010_0000;
        if self.flag_n {
            status |= 0b1000_0000;
        }
        if self.flag_v {
            status |= 0b0100_0000;
        }
        if self.flag_b {
            status |= 0b0001_0000;
        }
        if self.flag_d {
            status |= 0b0000_1000;
        }
        if self.flag_i {
            status |= 0b0000_0100;
        }
        if self.flag_z {
            status |= 0b0000_0010;
        }
        if self.flag_c {
            status |= 0b0000_0001;
        }
        status
    }

    /// Unpack a status byte pulled from the stack.
    ///
    /// B and bit 5 are not real flags; the pulled value of those bits is
    /// discarded, matching hardware.
    pub fn set_status_byte(&mut self, status: u8) {
        self.flag_n = status & 0b1000_0000 != 0;
        self.flag_v = status & 0b0100_0000 != 0;
        self.flag_d = status & 0b0000_1000 != 0;
        self.flag_i = status & 0b0000_0100 != 0;
        self.flag_z = status & 0b0000_0010 != 0;
        self.flag_c = status & 0b0000_0001 != 0;
    }
}

/// Whether an effective-address computation serves a read or a write.
///
/// Indexed reads may use the fast path (the extra cycle only happens when
/// the index carries into the high address byte); indexed writes and
/// read-modify-writes always pay it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemoryAccess {
    Read,
    Write,
}

fn page_crossed(base: u16, effective: u16) -> bool {
    base & 0xFF00 != effective & 0xFF00
}

/// 6502 interpreter core.
///
/// # Examples
///
/// ```
/// use emu6502::{Clock, Cpu, Memory16, Ram};
///
/// let clock = Clock::new();
/// let mut memory = Ram::new(&clock);
/// memory.write_bulk(0x8000, &[0xA9, 0x00]).unwrap(); // LDA #$00
///
/// let mut cpu = Cpu::new(&mut memory, &clock);
/// cpu.reg.program_counter = 0x8000;
/// cpu.execute_next_instruction().unwrap();
///
/// assert_eq!(cpu.reg.a, 0x00);
/// assert!(cpu.reg.flag_z);
/// assert_eq!(clock.current_cycle(), 2);
/// ```
pub struct Cpu<'a, M: Memory16> {
    memory: &'a mut M,
    clock: &'a Clock,
    pub reg: Registers,
}

impl<'a, M: Memory16> Cpu<'a, M> {
    /// Create a CPU over borrowed memory and clock. Registers start zeroed
    /// with the stack pointer at 0xFD; the program counter is 0 until
    /// [`Cpu::reset`] runs or the caller sets it.
    pub fn new(memory: &'a mut M, clock: &'a Clock) -> Self {
        Self {
            memory,
            clock,
            reg: Registers {
                stack_pointer: 0xFD,
                ..Registers::default()
            },
        }
    }

    /// Power-on reset: load PC from the reset vector at 0xFFFC/0xFFFD,
    /// set the stack pointer to 0xFD and the interrupt disable flag.
    ///
    /// Vector reads are setup accesses and do not tick the clock.
    pub fn reset(&mut self) -> Result<(), ExecutionError> {
        let vector = self.memory.read_range(0xFFFC, 2)?;
        self.reg = Registers {
            stack_pointer: 0xFD,
            flag_i: true,
            program_counter: u16::from_le_bytes([vector[0], vector[1]]),
            ..Registers::default()
        };
        Ok(())
    }

    /// Execute exactly one instruction.
    ///
    /// Fetches the opcode at PC, decodes it through the opcode table,
    /// computes the effective operand, executes and updates flags. PC ends
    /// up past the instruction unless the instruction itself set it (jumps,
    /// taken branches, returns).
    pub fn execute_next_instruction(&mut self) -> Result<(), ExecutionError> {
        let pc = self.reg.program_counter;
        let opcode = self.fetch_next_byte()?;
        let info = opcodes::decode(opcode).ok_or(ExecutionError::IllegalOpcode { opcode, pc })?;
        self.dispatch(info)
    }

    /// Run instructions until BRK halts, an execution error occurs, or the
    /// wall-clock budget runs out.
    ///
    /// The budget is checked at instruction fetch boundaries only, never in
    /// the middle of an instruction.
    pub fn execute_with_timeout(&mut self, limit: Duration) -> Result<(), ExecutionError> {
        let deadline = Instant::now() + limit;
        loop {
            if Instant::now() >= deadline {
                return Err(ExecutionError::Timeout {
                    cycles: self.clock.current_cycle(),
                });
            }
            self.execute_next_instruction()?;
        }
    }

    fn dispatch(&mut self, info: &OpcodeInfo) -> Result<(), ExecutionError> {
        use crate::instructions::{
            alu, branches, control, flags, inc_dec, load_store, shifts, stack, transfer,
        };
        match info.mnemonic {
            Mnemonic::Adc => alu::execute_adc(self, info),
            Mnemonic::And => alu::execute_and(self, info),
            Mnemonic::Asl => shifts::execute_asl(self, info),
            Mnemonic::Bcc => branches::execute_bcc(self, info),
            Mnemonic::Bcs => branches::execute_bcs(self, info),
            Mnemonic::Beq => branches::execute_beq(self, info),
            Mnemonic::Bit => alu::execute_bit(self, info),
            Mnemonic::Bmi => branches::execute_bmi(self, info),
            Mnemonic::Bne => branches::execute_bne(self, info),
            Mnemonic::Bpl => branches::execute_bpl(self, info),
            Mnemonic::Brk => control::execute_brk(self, info),
            Mnemonic::Bvc => branches::execute_bvc(self, info),
            Mnemonic::Bvs => branches::execute_bvs(self, info),
            Mnemonic::Clc => flags::execute_clc(self, info),
            Mnemonic::Cld => flags::execute_cld(self, info),
            Mnemonic::Cli => flags::execute_cli(self, info),
            Mnemonic::Clv => flags::execute_clv(self, info),
            Mnemonic::Cmp => alu::execute_cmp(self, info),
            Mnemonic::Cpx => alu::execute_cpx(self, info),
            Mnemonic::Cpy => alu::execute_cpy(self, info),
            Mnemonic::Dec => inc_dec::execute_dec(self, info),
            Mnemonic::Dex => inc_dec::execute_dex(self, info),
            Mnemonic::Dey => inc_dec::execute_dey(self, info),
            Mnemonic::Eor => alu::execute_eor(self, info),
            Mnemonic::Inc => inc_dec::execute_inc(self, info),
            Mnemonic::Inx => inc_dec::execute_inx(self, info),
            Mnemonic::Iny => inc_dec::execute_iny(self, info),
            Mnemonic::Jmp => control::execute_jmp(self, info),
            Mnemonic::Jsr => control::execute_jsr(self, info),
            Mnemonic::Lda => load_store::execute_lda(self, info),
            Mnemonic::Ldx => load_store::execute_ldx(self, info),
            Mnemonic::Ldy => load_store::execute_ldy(self, info),
            Mnemonic::Lsr => shifts::execute_lsr(self, info),
            Mnemonic::Nop => control::execute_nop(self, info),
            Mnemonic::Ora => alu::execute_ora(self, info),
            Mnemonic::Pha => stack::execute_pha(self, info),
            Mnemonic::Php => stack::execute_php(self, info),
            Mnemonic::Pla => stack::execute_pla(self, info),
            Mnemonic::Plp => stack::execute_plp(self, info),
            Mnemonic::Rol => shifts::execute_rol(self, info),
            Mnemonic::Ror => shifts::execute_ror(self, info),
            Mnemonic::Rti => control::execute_rti(self, info),
            Mnemonic::Rts => control::execute_rts(self, info),
            Mnemonic::Sbc => alu::execute_sbc(self, info),
            Mnemonic::Sec => flags::execute_sec(self, info),
            Mnemonic::Sed => flags::execute_sed(self, info),
            Mnemonic::Sei => flags::execute_sei(self, info),
            Mnemonic::Sta => load_store::execute_sta(self, info),
            Mnemonic::Stx => load_store::execute_stx(self, info),
            Mnemonic::Sty => load_store::execute_sty(self, info),
            Mnemonic::Tax => transfer::execute_tax(self, info),
            Mnemonic::Tay => transfer::execute_tay(self, info),
            Mnemonic::Tsx => transfer::execute_tsx(self, info),
            Mnemonic::Txa => transfer::execute_txa(self, info),
            Mnemonic::Txs => transfer::execute_txs(self, info),
            Mnemonic::Tya => transfer::execute_tya(self, info),
        }
    }

    // ========== Bus and Clock Helpers ==========

    /// One internal cycle: clock advances, no bus traffic.
    pub(crate) fn tick(&self) {
        self.clock.wait_for_next_cycle();
    }

    pub(crate) fn load(&mut self, address: u16) -> Result<u8, ExecutionError> {
        Ok(self.memory.load(address)?)
    }

    pub(crate) fn store(&mut self, address: u16, value: u8) -> Result<(), ExecutionError> {
        Ok(self.memory.store(address, value)?)
    }

    /// Fetch the byte at PC and advance PC.
    pub(crate) fn fetch_next_byte(&mut self) -> Result<u8, ExecutionError> {
        let byte = self.load(self.reg.program_counter)?;
        self.reg.program_counter = self.reg.program_counter.wrapping_add(1);
        Ok(byte)
    }

    /// Fetch a little-endian word at PC and advance PC by two.
    pub(crate) fn fetch_next_word(&mut self) -> Result<u16, ExecutionError> {
        let lo = self.fetch_next_byte()?;
        let hi = self.fetch_next_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub(crate) fn push(&mut self, value: u8) -> Result<(), ExecutionError> {
        self.store(0x0100 | u16::from(self.reg.stack_pointer), value)?;
        self.reg.stack_pointer = self.reg.stack_pointer.wrapping_sub(1);
        Ok(())
    }

    pub(crate) fn pull(&mut self) -> Result<u8, ExecutionError> {
        self.reg.stack_pointer = self.reg.stack_pointer.wrapping_add(1);
        self.load(0x0100 | u16::from(self.reg.stack_pointer))
    }

    /// Compute the effective address for a memory-operand mode, emitting
    /// the exact bus and internal cycles of the hardware sequence.
    pub(crate) fn effective_address(
        &mut self,
        mode: AddressMode,
        access: MemoryAccess,
    ) -> Result<u16, ExecutionError> {
        match mode {
            AddressMode::ZeroPage => Ok(u16::from(self.fetch_next_byte()?)),
            AddressMode::ZeroPageX => {
                let base = self.fetch_next_byte()?;
                self.tick();
                Ok(u16::from(base.wrapping_add(self.reg.x)))
            }
            AddressMode::ZeroPageY => {
                let base = self.fetch_next_byte()?;
                self.tick();
                Ok(u16::from(base.wrapping_add(self.reg.y)))
            }
            AddressMode::Absolute => self.fetch_next_word(),
            AddressMode::AbsoluteX | AddressMode::AbsoluteY => {
                let base = self.fetch_next_word()?;
                let index = if mode == AddressMode::AbsoluteX {
                    self.reg.x
                } else {
                    self.reg.y
                };
                let effective = base.wrapping_add(u16::from(index));
                if access == MemoryAccess::Write || page_crossed(base, effective) {
                    self.tick();
                }
                Ok(effective)
            }
            AddressMode::IndirectX => {
                let zp = self.fetch_next_byte()?.wrapping_add(self.reg.x);
                self.tick();
                let lo = self.load(u16::from(zp))?;
                let hi = self.load(u16::from(zp.wrapping_add(1)))?;
                Ok(u16::from_le_bytes([lo, hi]))
            }
            AddressMode::IndirectY => {
                let zp = self.fetch_next_byte()?;
                let lo = self.load(u16::from(zp))?;
                let hi = self.load(u16::from(zp.wrapping_add(1)))?;
                let base = u16::from_le_bytes([lo, hi]);
                let effective = base.wrapping_add(u16::from(self.reg.y));
                if access == MemoryAccess::Write || page_crossed(base, effective) {
                    self.tick();
                }
                Ok(effective)
            }
            AddressMode::Indirect => {
                let pointer = self.fetch_next_word()?;
                let lo = self.load(pointer)?;
                // Hardware quirk: the pointer's high byte does not carry
                // across a page boundary, so ($10FF) reads $10FF and $1000.
                let hi_address = if pointer & 0x00FF == 0x00FF {
                    pointer & 0xFF00
                } else {
                    pointer.wrapping_add(1)
                };
                let hi = self.load(hi_address)?;
                Ok(u16::from_le_bytes([lo, hi]))
            }
            AddressMode::Implied | AddressMode::Accumulator | AddressMode::Immediate
            | AddressMode::Relative => {
                unreachable!("no effective address for {mode:?}")
            }
        }
    }

    /// Read the operand value of a read-style instruction.
    pub(crate) fn read_operand(&mut self, info: &OpcodeInfo) -> Result<u8, ExecutionError> {
        match info.mode {
            AddressMode::Immediate => self.fetch_next_byte(),
            _ => {
                let address = self.effective_address(info.mode, MemoryAccess::Read)?;
                self.load(address)
            }
        }
    }

    /// Set N and Z from a result byte.
    pub(crate) fn set_nz(&mut self, value: u8) {
        self.reg.flag_z = value == 0;
        self.reg.flag_n = value & 0x80 != 0;
    }
}
