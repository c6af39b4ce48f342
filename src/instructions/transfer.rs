//! Register transfer instructions: TAX, TAY, TSX, TXA, TXS, TYA.
//!
//! All are two-cycle implied instructions. Every transfer updates N and Z
//! except TXS, which moves X into the stack pointer untouched.

use crate::cpu::Cpu;
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

pub(crate) fn execute_tax<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.x = cpu.reg.a;
    cpu.set_nz(cpu.reg.x);
    Ok(())
}

pub(crate) fn execute_tay<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.y = cpu.reg.a;
    cpu.set_nz(cpu.reg.y);
    Ok(())
}

pub(crate) fn execute_txa<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.a = cpu.reg.x;
    cpu.set_nz(cpu.reg.a);
    Ok(())
}

pub(crate) fn execute_tya<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.a = cpu.reg.y;
    cpu.set_nz(cpu.reg.a);
    Ok(())
}

pub(crate) fn execute_tsx<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.x = cpu.reg.stack_pointer;
    cpu.set_nz(cpu.reg.x);
    Ok(())
}

pub(crate) fn execute_txs<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.stack_pointer = cpu.reg.x;
    Ok(())
}
