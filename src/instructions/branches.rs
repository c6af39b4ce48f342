//! Conditional branch instructions: BCC, BCS, BEQ, BMI, BNE, BPL, BVC, BVS.
//!
//! All branches are relative: the operand is a signed offset from the byte
//! after the operand. Cycle timing: 2 not taken, 3 taken within the same
//! page, 4 taken across a page boundary.

use crate::cpu::Cpu;
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

fn branch_if<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    condition: bool,
) -> Result<(), ExecutionError> {
    let offset = cpu.fetch_next_byte()? as i8;
    if condition {
        cpu.tick();
        let base = cpu.reg.program_counter;
        let target = base.wrapping_add_signed(i16::from(offset));
        if base & 0xFF00 != target & 0xFF00 {
            cpu.tick();
        }
        cpu.reg.program_counter = target;
    }
    Ok(())
}

pub(crate) fn execute_bcc<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = !cpu.reg.flag_c;
    branch_if(cpu, condition)
}

pub(crate) fn execute_bcs<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = cpu.reg.flag_c;
    branch_if(cpu, condition)
}

pub(crate) fn execute_beq<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = cpu.reg.flag_z;
    branch_if(cpu, condition)
}

pub(crate) fn execute_bne<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = !cpu.reg.flag_z;
    branch_if(cpu, condition)
}

pub(crate) fn execute_bmi<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = cpu.reg.flag_n;
    branch_if(cpu, condition)
}

pub(crate) fn execute_bpl<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = !cpu.reg.flag_n;
    branch_if(cpu, condition)
}

pub(crate) fn execute_bvs<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = cpu.reg.flag_v;
    branch_if(cpu, condition)
}

pub(crate) fn execute_bvc<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    _info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let condition = !cpu.reg.flag_v;
    branch_if(cpu, condition)
}
