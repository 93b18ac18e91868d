//! Arithmetic, memory and branch operations of the LMC.
//!
//! The accumulator has the width of a word, `ADD` and `SUB` wrap around in two's complement.
//! That keeps `STA` lossless and makes `SUB` undo a preceding `ADD` of the same value.
use crate::emulator::instruction::Instruction;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;

/// ADD: accumulator += mailbox
pub fn add(i: Instruction, r: &mut Registers, memory: &Memory) {
    r.set_accumulator(r.accumulator().wrapping_add(memory[i.operand]));
}
/// SUB: accumulator -= mailbox
pub fn sub(i: Instruction, r: &mut Registers, memory: &Memory) {
    r.set_accumulator(r.accumulator().wrapping_sub(memory[i.operand]));
}
/// STA: mailbox = accumulator
pub fn sta(i: Instruction, r: &Registers, memory: &mut Memory) {
    memory[i.operand] = r.accumulator();
}
/// LDA: accumulator = mailbox
pub fn lda(i: Instruction, r: &mut Registers, memory: &Memory) {
    r.set_accumulator(memory[i.operand]);
}
/// BRA: unconditional branch
pub fn bra(i: Instruction, r: &mut Registers) {
    r.set_pc(i.operand);
}
/// BRZ: branch if the accumulator is zero
pub fn brz(i: Instruction, r: &mut Registers) {
    if r.accumulator() == 0 {
        r.set_pc(i.operand);
    }
}
/// BRP: branch if the accumulator is zero or positive
pub fn brp(i: Instruction, r: &mut Registers) {
    if r.accumulator() >= 0 {
        r.set_pc(i.operand);
    }
}
