//! Arithmetic and logic instructions: ADC, SBC, AND, ORA, EOR, CMP, CPX,
//! CPY, BIT.
//!
//! ADC/SBC are binary regardless of the D flag. SBC is ADC of the one's
//! complement of the operand: carry acts as inverted borrow and the same
//! overflow formula applies.

use crate::cpu::Cpu;
use crate::memory::Memory16;
use crate::opcodes::OpcodeInfo;
use crate::ExecutionError;

/// Add `operand` plus carry into A, setting N, Z, C and V.
fn add_with_carry<M: Memory16>(cpu: &mut Cpu<'_, M>, operand: u8) {
    let a = cpu.reg.a;
    let sum = u16::from(a) + u16::from(operand) + u16::from(cpu.reg.flag_c);
    let result = sum as u8;

    cpu.reg.flag_c = sum > 0xFF;
    // Signed overflow: both inputs agree in sign and the result disagrees
    cpu.reg.flag_v = (a ^ result) & (operand ^ result) & 0x80 != 0;
    cpu.reg.a = result;
    cpu.set_nz(result);
}

pub(crate) fn execute_adc<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    add_with_carry(cpu, operand);
    Ok(())
}

pub(crate) fn execute_sbc<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    add_with_carry(cpu, !operand);
    Ok(())
}

pub(crate) fn execute_and<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    cpu.reg.a &= operand;
    cpu.set_nz(cpu.reg.a);
    Ok(())
}

pub(crate) fn execute_ora<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    cpu.reg.a |= operand;
    cpu.set_nz(cpu.reg.a);
    Ok(())
}

pub(crate) fn execute_eor<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    cpu.reg.a ^= operand;
    cpu.set_nz(cpu.reg.a);
    Ok(())
}

/// Shared compare: C = register >= operand, N/Z from register - operand.
fn compare<M: Memory16>(cpu: &mut Cpu<'_, M>, register: u8, operand: u8) {
    cpu.reg.flag_c = register >= operand;
    cpu.set_nz(register.wrapping_sub(operand));
}

pub(crate) fn execute_cmp<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    let a = cpu.reg.a;
    compare(cpu, a, operand);
    Ok(())
}

pub(crate) fn execute_cpx<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    let x = cpu.reg.x;
    compare(cpu, x, operand);
    Ok(())
}

pub(crate) fn execute_cpy<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    let y = cpu.reg.y;
    compare(cpu, y, operand);
    Ok(())
}

pub(crate) fn execute_bit<M: Memory16>(
    cpu: &mut Cpu<'_, M>,
    info: &OpcodeInfo,
) -> Result<(), ExecutionError> {
    let operand = cpu.read_operand(info)?;
    cpu.reg.flag_z = cpu.reg.a & operand == 0;
    cpu.reg.flag_n = operand & 0x80 != 0;
    cpu.reg.flag_v = operand & 0x40 != 0;
    Ok(())
}
