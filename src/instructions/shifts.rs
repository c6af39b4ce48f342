//! Shift and rotate instructions: ASL, LSR, ROL, ROR.
//!
//! Memory forms are read-modify-write: the hardware reads the operand,
//! spends a cycle writing the unmodified value back, then writes the
//! result. The dummy write is emitted as an internal tick.

use crate::cpu::{Cpu, MemoryAccess};
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::{AddressMode, ExecutionError};

fn asl<M: Memory16>(cpu: &mut Cpu<'_, M>, value: u8) -> u8 {
    cpu.reg.flag_c = value & 0x80 != 0;
    let result = value << 1;
    cpu.set_nz(result);
    result
}

fn lsr<M: Memory16>(cpu: &mut Cpu<'_, M>, value: u8) -> u8 {
    cpu.reg.flag_c = value & 0x01 != 0;
    let result = value >> 1;
    cpu.set_nz(result);
    result
}

fn rol<M: Memory16>(cpu: &mut Cpu<'_, M>, value: u8) -> u8 {
    let carry_in = u8::from(cpu.reg.flag_c);
    cpu.reg.flag_c = value & 0x80 != 0;
    let result = (value << 1) | carry_in;
    cpu.set_nz(result);
    result
}

fn ror<M: Memory16>(cpu: &mut Cpu<'_, M>, value: u8) -> u8 {
    let carry_in = u8::from(cpu.reg.flag_c) << 7;
    cpu.reg.flag_c = value & 0x01 != 0;
    let result = (value >> 1) | carry_in;
    cpu.set_nz(result);
    result
}

/// Run one shift/rotate in either accumulator or read-modify-write form.
fn shift_operation<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
    operation: fn(&mut Cpu<'_, M>, u8) -> u8,
) -> Result<(), ExecutionError> {
    if info.mode == AddressMode::Accumulator {
        cpu.tick();
        let value = cpu.reg.a;
        cpu.reg.a = operation(cpu, value);
        return Ok(());
    }

    let address = cpu.effective_address(info.mode, MemoryAccess::Write)?;
    let value = cpu.load(address)?;
    cpu.tick(); // dummy write-back of the original value
    let result = operation(cpu, value);
    cpu.store(address, result)
}

pub(crate) fn execute_asl<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    shift_operation(cpu, info, asl)
}

pub(crate) fn execute_lsr<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    shift_operation(cpu, info, lsr)
}

pub(crate) fn execute_rol<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    shift_operation(cpu, info, rol)
}

pub(crate) fn execute_ror<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    shift_operation(cpu, info, ror)
}
