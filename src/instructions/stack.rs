//! Stack instructions: PHA, PHP, PLA, PLP.
//!
//! PHP pushes with B and bit 5 set, like BRK. PLP discards the pulled B
//! bit; it is not a real flag.

use crate::cpu::Cpu;
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

pub(crate) fn execute_pha<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.push(cpu.reg.a)
}

pub(crate) fn execute_php<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.push(cpu.reg.status_byte() | 0b0011_0000)
}

pub(crate) fn execute_pla<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.tick();
    let value = cpu.pull()?;
    cpu.reg.a = value;
    cpu.set_nz(value);
    Ok(())
}

pub(crate) fn execute_plp<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.tick();
    let status = cpu.pull()?;
    cpu.reg.set_status_byte(status);
    Ok(())
}
