//! Load and store instructions: LDA, LDX, LDY, STA, STX, STY.
//!
//! Loads set N and Z from the loaded value; stores affect no flags. Indexed
//! stores always pay the index cycle, which is why STA AbsoluteX is 5
//! cycles while LDA AbsoluteX is 4 (+1 only on page cross).

use crate::cpu::{Cpu, MemoryAccess};
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

pub(crate) fn execute_lda<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let value = cpu.read_operand(info)?;
    cpu.reg.a = value;
    cpu.set_nz(value);
    Ok(())
}

pub(crate) fn execute_ldx<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let value = cpu.read_operand(info)?;
    cpu.reg.x = value;
    cpu.set_nz(value);
    Ok(())
}

pub(crate) fn execute_ldy<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let value = cpu.read_operand(info)?;
    cpu.reg.y = value;
    cpu.set_nz(value);
    Ok(())
}

pub(crate) fn execute_sta<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let address = cpu.effective_address(info.mode, MemoryAccess::Write)?;
    cpu.store(address, cpu.reg.a)
}

pub(crate) fn execute_stx<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let address = cpu.effective_address(info.mode, MemoryAccess::Write)?;
    cpu.store(address, cpu.reg.x)
}

pub(crate) fn execute_sty<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let address = cpu.effective_address(info.mode, MemoryAccess::Write)?;
    cpu.store(address, cpu.reg.y)
}
