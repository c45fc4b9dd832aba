//! The default CHIP-8 instruction set, organized as a tree of bit-masked
//! lookup tables rather than a flat match.
//!
//! The top-level registry indexes on the high nibble. Families 0x0, 0x8,
//! 0xE and 0xF delegate to nested registries that index on a lower
//! bit-field of the same opcode. Each leaf carries an `execute` function
//! that mutates the machine state and a `disassemble` function that renders
//! the canonical mnemonic from the opcode bits alone.

use std::collections::HashMap;

use rand::Rng;

use crate::registry::{DisassembleFn, ExecuteFn, Instruction, InstructionRegistry, Slot};

fn instruction(execute: ExecuteFn, disassemble: DisassembleFn) -> Slot {
    Slot::Instruction(Instruction {
        execute,
        disassemble,
    })
}

/// 00xx family: machine control instructions, indexed by the low byte.
fn system_instructions() -> InstructionRegistry {
    InstructionRegistry::new(
        0x00FF,
        0,
        HashMap::from([
            // 00E0 - CLS: clear the display
            (
                0xE0,
                instruction(
                    |cpu, _opcode| {
                        cpu.monitor.clear();
                        Ok(())
                    },
                    |_opcode| "CLS".to_string(),
                ),
            ),
            // 00EE - RET: return from a subroutine
            (
                0xEE,
                instruction(
                    |cpu, _opcode| {
                        cpu.pc = cpu.pop_stack()?;
                        Ok(())
                    },
                    |_opcode| "RET".to_string(),
                ),
            ),
            // 00FD - EXIT: signal halt to the host
            (
                0xFD,
                instruction(
                    |cpu, _opcode| {
                        cpu.should_exit = true;
                        Ok(())
                    },
                    |_opcode| "EXIT".to_string(),
                ),
            ),
        ]),
    )
}

/// 8xyn family: register-register ALU instructions, indexed by the low
/// nibble. The flag register is always written last, so it wins when VF is
/// the destination.
fn register_instructions() -> InstructionRegistry {
    InstructionRegistry::new(
        0x000F,
        0,
        HashMap::from([
            // 8xy0 - LD Vx, Vy: set Vx = Vy
            (
                0x0,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] = cpu.v[opcode.y()];
                        Ok(())
                    },
                    |opcode| format!("LD   V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xy1 - OR Vx, Vy
            (
                0x1,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] |= cpu.v[opcode.y()];
                        Ok(())
                    },
                    |opcode| format!("OR   V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xy2 - AND Vx, Vy
            (
                0x2,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] &= cpu.v[opcode.y()];
                        Ok(())
                    },
                    |opcode| format!("AND  V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xy3 - XOR Vx, Vy
            (
                0x3,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] ^= cpu.v[opcode.y()];
                        Ok(())
                    },
                    |opcode| format!("XOR  V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xy4 - ADD Vx, Vy: set Vx = Vx + Vy, VF = carry
            (
                0x4,
                instruction(
                    |cpu, opcode| {
                        let sum = cpu.v[opcode.x()] as u16 + cpu.v[opcode.y()] as u16;
                        cpu.v[opcode.x()] = (sum & 0xFF) as u8;
                        cpu.v[0xF] = (sum > 0xFF) as u8;
                        Ok(())
                    },
                    |opcode| format!("ADD  V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xy5 - SUB Vx, Vy: set Vx = Vx - Vy, VF = NOT borrow
            (
                0x5,
                instruction(
                    |cpu, opcode| {
                        let no_borrow = cpu.v[opcode.x()] >= cpu.v[opcode.y()];
                        cpu.v[opcode.x()] = cpu.v[opcode.x()].wrapping_sub(cpu.v[opcode.y()]);
                        cpu.v[0xF] = no_borrow as u8;
                        Ok(())
                    },
                    |opcode| format!("SUB  V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xy6 - SHR Vx: shift right by one, VF = dropped bit
            (
                0x6,
                instruction(
                    |cpu, opcode| {
                        let lsb = cpu.v[opcode.x()] & 0x1;
                        cpu.v[opcode.x()] >>= 1;
                        cpu.v[0xF] = lsb;
                        Ok(())
                    },
                    |opcode| format!("SHR  V{:X}", opcode.x()),
                ),
            ),
            // 8xy7 - SUBN Vx, Vy: set Vx = Vy - Vx, VF = NOT borrow
            (
                0x7,
                instruction(
                    |cpu, opcode| {
                        let no_borrow = cpu.v[opcode.y()] >= cpu.v[opcode.x()];
                        cpu.v[opcode.x()] = cpu.v[opcode.y()].wrapping_sub(cpu.v[opcode.x()]);
                        cpu.v[0xF] = no_borrow as u8;
                        Ok(())
                    },
                    |opcode| format!("SUBN V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 8xyE - SHL Vx: shift left by one, VF = dropped bit
            (
                0xE,
                instruction(
                    |cpu, opcode| {
                        let msb = cpu.v[opcode.x()] >> 7;
                        cpu.v[opcode.x()] <<= 1;
                        cpu.v[0xF] = msb;
                        Ok(())
                    },
                    |opcode| format!("SHL  V{:X}", opcode.x()),
                ),
            ),
        ]),
    )
}

/// Exxx family: key state tests, indexed by the low byte.
fn key_instructions() -> InstructionRegistry {
    InstructionRegistry::new(
        0x00FF,
        0,
        HashMap::from([
            // Ex9E - SKP Vx: skip next instruction if key Vx is pressed
            (
                0x9E,
                instruction(
                    |cpu, opcode| {
                        if cpu.key_press_states[cpu.v[opcode.x()] as usize & 0x0F] {
                            cpu.pc += 2;
                        }
                        Ok(())
                    },
                    |opcode| format!("SKP  V{:X}", opcode.x()),
                ),
            ),
            // ExA1 - SKNP Vx: skip next instruction if key Vx is not pressed
            (
                0xA1,
                instruction(
                    |cpu, opcode| {
                        if !cpu.key_press_states[cpu.v[opcode.x()] as usize & 0x0F] {
                            cpu.pc += 2;
                        }
                        Ok(())
                    },
                    |opcode| format!("SKNP V{:X}", opcode.x()),
                ),
            ),
        ]),
    )
}

/// Fxxx family: timers, key wait, index arithmetic, font, BCD and register
/// block transfers, indexed by the low byte.
fn misc_instructions() -> InstructionRegistry {
    InstructionRegistry::new(
        0x00FF,
        0,
        HashMap::from([
            // Fx07 - LD Vx, DT: read the delay timer
            (
                0x07,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] = cpu.delay_timer;
                        Ok(())
                    },
                    |opcode| format!("LD   V{:X}, DT", opcode.x()),
                ),
            ),
            // Fx0A - LD Vx, K: wait for a key press. While no key is down,
            // the PC is rolled back so the instruction retries next step.
            (
                0x0A,
                instruction(
                    |cpu, opcode| {
                        match cpu.key_press_states.iter().position(|&pressed| pressed) {
                            Some(key) => cpu.v[opcode.x()] = key as u8,
                            None => cpu.pc -= 2,
                        }
                        Ok(())
                    },
                    |opcode| format!("LD   V{:X}, K", opcode.x()),
                ),
            ),
            // Fx15 - LD DT, Vx: set the delay timer
            (
                0x15,
                instruction(
                    |cpu, opcode| {
                        cpu.delay_timer = cpu.v[opcode.x()];
                        Ok(())
                    },
                    |opcode| format!("LD   DT, V{:X}", opcode.x()),
                ),
            ),
            // Fx18 - LD ST, Vx: set the sound timer
            (
                0x18,
                instruction(
                    |cpu, opcode| {
                        cpu.sound_timer = cpu.v[opcode.x()];
                        Ok(())
                    },
                    |opcode| format!("LD   ST, V{:X}", opcode.x()),
                ),
            ),
            // Fx1E - ADD I, Vx
            (
                0x1E,
                instruction(
                    |cpu, opcode| {
                        cpu.i = cpu.i.wrapping_add(cpu.v[opcode.x()] as u16);
                        Ok(())
                    },
                    |opcode| format!("ADD  I, V{:X}", opcode.x()),
                ),
            ),
            // Fx29 - LD F, Vx: point I at the sprite for digit Vx
            (
                0x29,
                instruction(
                    |cpu, opcode| {
                        let digit = cpu.v[opcode.x()] as usize & 0x0F;
                        cpu.i = cpu.digit_sprite_locations[digit];
                        Ok(())
                    },
                    |opcode| format!("LD   F, V{:X}", opcode.x()),
                ),
            ),
            // Fx33 - LD B, Vx: store the BCD representation of Vx at
            // I, I+1 and I+2
            (
                0x33,
                instruction(
                    |cpu, opcode| {
                        let value = cpu.v[opcode.x()];
                        let address = cpu.i as usize;
                        cpu.memory.write_byte(address, value / 100)?;
                        cpu.memory.write_byte(address + 1, value / 10 % 10)?;
                        cpu.memory.write_byte(address + 2, value % 10)?;
                        Ok(())
                    },
                    |opcode| format!("LD   B, V{:X}", opcode.x()),
                ),
            ),
            // Fx55 - LD [I], Vx: store V0..=Vx starting at I
            (
                0x55,
                instruction(
                    |cpu, opcode| {
                        for offset in 0..=opcode.x() {
                            cpu.memory.write_byte(cpu.i as usize + offset, cpu.v[offset])?;
                        }
                        Ok(())
                    },
                    |opcode| format!("LD   [I], V{:X}", opcode.x()),
                ),
            ),
            // Fx65 - LD Vx, [I]: read V0..=Vx starting at I
            (
                0x65,
                instruction(
                    |cpu, opcode| {
                        for offset in 0..=opcode.x() {
                            cpu.v[offset] = cpu.memory.read_byte(cpu.i as usize + offset)?;
                        }
                        Ok(())
                    },
                    |opcode| format!("LD   V{:X}, [I]", opcode.x()),
                ),
            ),
        ]),
    )
}

/// Builds the full instruction registry tree, indexed on the high nibble at
/// the top level.
pub fn default_set() -> InstructionRegistry {
    InstructionRegistry::new(
        0x0F,
        12,
        HashMap::from([
            (0x0, Slot::Registry(system_instructions())),
            // 1nnn - JP addr
            (
                0x1,
                instruction(
                    |cpu, opcode| {
                        cpu.pc = opcode.nnn();
                        Ok(())
                    },
                    |opcode| format!("JP   0x{:03X}", opcode.nnn()),
                ),
            ),
            // 2nnn - CALL addr: push the return address, then jump
            (
                0x2,
                instruction(
                    |cpu, opcode| {
                        let return_address = cpu.pc;
                        cpu.push_stack(return_address)?;
                        cpu.pc = opcode.nnn();
                        Ok(())
                    },
                    |opcode| format!("CALL 0x{:03X}", opcode.nnn()),
                ),
            ),
            // 3xkk - SE Vx, byte: skip next instruction if Vx == kk
            (
                0x3,
                instruction(
                    |cpu, opcode| {
                        if cpu.v[opcode.x()] == opcode.kk() {
                            cpu.pc += 2;
                        }
                        Ok(())
                    },
                    |opcode| format!("SE   V{:X}, 0x{:02X}", opcode.x(), opcode.kk()),
                ),
            ),
            // 4xkk - SNE Vx, byte: skip next instruction if Vx != kk
            (
                0x4,
                instruction(
                    |cpu, opcode| {
                        if cpu.v[opcode.x()] != opcode.kk() {
                            cpu.pc += 2;
                        }
                        Ok(())
                    },
                    |opcode| format!("SNE  V{:X}, 0x{:02X}", opcode.x(), opcode.kk()),
                ),
            ),
            // 5xy0 - SE Vx, Vy: skip next instruction if Vx == Vy
            (
                0x5,
                instruction(
                    |cpu, opcode| {
                        if cpu.v[opcode.x()] == cpu.v[opcode.y()] {
                            cpu.pc += 2;
                        }
                        Ok(())
                    },
                    |opcode| format!("SE   V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // 6xkk - LD Vx, byte
            (
                0x6,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] = opcode.kk();
                        Ok(())
                    },
                    |opcode| format!("LD   V{:X}, 0x{:02X}", opcode.x(), opcode.kk()),
                ),
            ),
            // 7xkk - ADD Vx, byte: no carry flag
            (
                0x7,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] = cpu.v[opcode.x()].wrapping_add(opcode.kk());
                        Ok(())
                    },
                    |opcode| format!("ADD  V{:X}, 0x{:02X}", opcode.x(), opcode.kk()),
                ),
            ),
            (0x8, Slot::Registry(register_instructions())),
            // 9xy0 - SNE Vx, Vy: skip next instruction if Vx != Vy
            (
                0x9,
                instruction(
                    |cpu, opcode| {
                        if cpu.v[opcode.x()] != cpu.v[opcode.y()] {
                            cpu.pc += 2;
                        }
                        Ok(())
                    },
                    |opcode| format!("SNE  V{:X}, V{:X}", opcode.x(), opcode.y()),
                ),
            ),
            // Annn - LD I, addr
            (
                0xA,
                instruction(
                    |cpu, opcode| {
                        cpu.i = opcode.nnn();
                        Ok(())
                    },
                    |opcode| format!("LD   I, 0x{:03X}", opcode.nnn()),
                ),
            ),
            // Bnnn - JP V0, addr: jump to nnn + V0
            (
                0xB,
                instruction(
                    |cpu, opcode| {
                        cpu.pc = cpu.v[0x0] as u16 + opcode.nnn();
                        Ok(())
                    },
                    |opcode| format!("JP   V0, 0x{:03X}", opcode.nnn()),
                ),
            ),
            // Cxkk - RND Vx, byte: set Vx = random byte AND kk
            (
                0xC,
                instruction(
                    |cpu, opcode| {
                        cpu.v[opcode.x()] = cpu.rng.gen::<u8>() & opcode.kk();
                        Ok(())
                    },
                    |opcode| format!("RND  V{:X}, 0x{:02X}", opcode.x(), opcode.kk()),
                ),
            ),
            // Dxyn - DRW Vx, Vy, nibble: XOR-blit the n-byte sprite at I to
            // (Vx, Vy), VF = collision
            (
                0xD,
                instruction(
                    |cpu, opcode| {
                        let x = cpu.v[opcode.x()] as usize;
                        let y = cpu.v[opcode.y()] as usize;
                        let sprite = cpu.memory.read_slice(cpu.i as usize, opcode.n() as usize)?;
                        let collision = cpu.monitor.draw_sprite(x, y, sprite);
                        cpu.v[0xF] = collision as u8;
                        Ok(())
                    },
                    |opcode| {
                        format!(
                            "DRW  V{:X}, V{:X}, 0x{:X}",
                            opcode.x(),
                            opcode.y(),
                            opcode.n()
                        )
                    },
                ),
            ),
            (0xE, Slot::Registry(key_instructions())),
            (0xF, Slot::Registry(misc_instructions())),
        ]),
    )
}
