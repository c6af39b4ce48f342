//! Increment and decrement instructions: INC, DEC, INX, INY, DEX, DEY.
//!
//! INC/DEC on memory are read-modify-write and follow the same dummy-write
//! cycle pattern as the shifts. The register forms are two-cycle implied
//! instructions.

use crate::cpu::{Cpu, MemoryAccess};
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

fn modify_memory<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
    delta: u8,
) -> Result<(), ExecutionError> {
    let address = cpu.effective_address(info.mode, MemoryAccess::Write)?;
    let value = cpu.load(address)?;
    cpu.tick(); // dummy write-back of the original value
    let result = value.wrapping_add(delta);
    cpu.set_nz(result);
    cpu.store(address, result)
}

pub(crate) fn execute_inc<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    modify_memory(cpu, info, 1)
}

pub(crate) fn execute_dec<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    modify_memory(cpu, info, 0xFF)
}

pub(crate) fn execute_inx<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.x = cpu.reg.x.wrapping_add(1);
    cpu.set_nz(cpu.reg.x);
    Ok(())
}

pub(crate) fn execute_iny<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.y = cpu.reg.y.wrapping_add(1);
    cpu.set_nz(cpu.reg.y);
    Ok(())
}

pub(crate) fn execute_dex<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.x = cpu.reg.x.wrapping_sub(1);
    cpu.set_nz(cpu.reg.x);
    Ok(())
}

pub(crate) fn execute_dey<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.y = cpu.reg.y.wrapping_sub(1);
    cpu.set_nz(cpu.reg.y);
    Ok(())
}
