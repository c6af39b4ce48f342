//! Flag manipulation instructions: CLC, CLD, CLI, CLV, SEC, SED, SEI.
//!
//! D and I are touched only here; nothing else in the interpreter sets
//! them implicitly (besides BRK setting I on interrupt entry).

use crate::cpu::Cpu;
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

pub(crate) fn execute_clc<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_c = false;
    Ok(())
}

pub(crate) fn execute_sec<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_c = true;
    Ok(())
}

pub(crate) fn execute_cld<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_d = false;
    Ok(())
}

pub(crate) fn execute_sed<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_d = true;
    Ok(())
}

pub(crate) fn execute_cli<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_i = false;
    Ok(())
}

pub(crate) fn execute_sei<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_i = true;
    Ok(())
}

pub(crate) fn execute_clv<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    cpu.tick();
    cpu.reg.flag_v = false;
    Ok(())
}
