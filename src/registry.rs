use std::collections::HashMap;

use crate::cpu::Cpu;
use crate::opcode::Opcode;
use crate::Result;

pub type ExecuteFn = fn(&mut Cpu, Opcode) -> Result<()>;
pub type DisassembleFn = fn(Opcode) -> String;

/// One entry of the instruction set: a pair of plain function pointers, one
/// that mutates the machine state and one that renders the canonical
/// mnemonic purely from the opcode bits.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub execute: ExecuteFn,
    pub disassemble: DisassembleFn,
}

/// A registry slot either resolves an opcode directly or delegates to a
/// nested registry that inspects a different bit-field of the same opcode.
pub enum Slot {
    Instruction(Instruction),
    Registry(InstructionRegistry),
}

/// A bit-masked lookup table mapping a sub-field of an opcode to a slot.
///
/// The index is `(opcode >> shift_right) & bitmask`. Registries nest to
/// resolve the multi-level opcode families (0x0, 0x8, 0xE, 0xF). A lookup
/// miss at any level yields `None`, which the CPU surfaces as an
/// unimplemented-opcode error.
pub struct InstructionRegistry {
    bitmask: u16,
    shift_right: u16,
    handlers: HashMap<u16, Slot>,
}

impl InstructionRegistry {
    pub fn new(bitmask: u16, shift_right: u16, handlers: HashMap<u16, Slot>) -> Self {
        InstructionRegistry {
            bitmask,
            shift_right,
            handlers,
        }
    }

    /// Resolves `opcode` through this registry and any nested ones.
    pub fn resolve(&self, opcode: Opcode) -> Option<Instruction> {
        let index = (opcode.0 >> self.shift_right) & self.bitmask;

        match self.handlers.get(&index)? {
            Slot::Instruction(instruction) => Some(*instruction),
            Slot::Registry(registry) => registry.resolve(opcode),
        }
    }
}
