//! Control flow instructions: JMP, JSR, RTS, RTI, BRK, NOP.
//!
//! JSR pushes the address of its own last byte (return address minus one);
//! RTS compensates by incrementing the pulled address. BRK performs the
//! full hardware interrupt entry and then halts the interpreter: with no
//! IRQ delivery model, reaching BRK is the program's way of stopping.

use crate::cpu::{Cpu, MemoryAccess};
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::{AddressMode, ExecutionError};

pub(crate) fn execute_nop<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    Ok(())
}

pub(crate) fn execute_jmp<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let target = match info.mode {
        AddressMode::Absolute => cpu.fetch_next_word()?,
        // Indirect reproduces the page-wrap pointer bug
        AddressMode::Indirect => cpu.effective_address(AddressMode::Indirect, MemoryAccess::Read)?,
        _ => unreachable!("JMP supports only absolute and indirect modes"),
    };
    cpu.reg.program_counter = target;
    Ok(())
}

pub(crate) fn execute_jsr<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let target_lo = cpu.fetch_next_byte()?;
    cpu.tick();
    // PC now addresses the high operand byte: the instruction's last byte,
    // i.e. the return address minus one
    let return_address = cpu.reg.program_counter;
    cpu.push((return_address >> 8) as u8)?;
    cpu.push((return_address & 0xFF) as u8)?;
    let target_hi = cpu.load(return_address)?;
    cpu.reg.program_counter = u16::from_le_bytes([target_lo, target_hi]);
    Ok(())
}

pub(crate) fn execute_rts<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.tick();
    let lo = cpu.pull()?;
    let hi = cpu.pull()?;
    cpu.tick();
    cpu.reg.program_counter = u16::from_le_bytes([lo, hi]).wrapping_add(1);
    Ok(())
}

pub(crate) fn execute_rti<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.tick();
    let status = cpu.pull()?;
    cpu.reg.set_status_byte(status);
    let lo = cpu.pull()?;
    let hi = cpu.pull()?;
    cpu.reg.program_counter = u16::from_le_bytes([lo, hi]);
    Ok(())
}

pub(crate) fn execute_brk<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let opcode_address = cpu.reg.program_counter.wrapping_sub(1);

    // BRK skips a padding byte, so the pushed return address is PC+2
    let _padding = cpu.fetch_next_byte()?;
    let return_address = cpu.reg.program_counter;
    cpu.push((return_address >> 8) as u8)?;
    cpu.push((return_address & 0xFF) as u8)?;
    // B is set in the pushed byte only
    cpu.push(cpu.reg.status_byte() | 0b0011_0000)?;
    cpu.reg.flag_i = true;

    let lo = cpu.load(0xFFFE)?;
    let hi = cpu.load(0xFFFF)?;
    cpu.reg.program_counter = u16::from_le_bytes([lo, hi]);

    // No IRQ handler model: BRK halts the run with the register file intact
    Err(ExecutionError::Halted {
        pc: opcode_address,
        registers: cpu.reg,
    })
}
