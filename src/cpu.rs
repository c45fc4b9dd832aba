use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::instructions;
use crate::memory::Memory;
use crate::monitor::Monitor;
use crate::opcode::Opcode;
use crate::registry::InstructionRegistry;
use crate::{Error, Result, FONT_GLYPH_SIZE, START_FONT, START_ROM};

pub const NUM_REGISTERS: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const NUM_KEYS: usize = 16;

/// The machine itself: registers, stack, timers, key states and the
/// fetch-decode-execute loop, together with the [`Memory`] and [`Monitor`]
/// it mutates.
///
/// The state fields are public so that debug overlays and renderers can read
/// them, but external readers must only look between [`Cpu::step`] calls,
/// never concurrently with one.
pub struct Cpu {
    pub memory: Memory,
    pub monitor: Monitor,

    /// General purpose registers V0..VF. VF doubles as the
    /// carry/borrow/collision flag.
    pub v: [u8; NUM_REGISTERS],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub stack: [u16; STACK_DEPTH],

    /// Delay and sound timers, decremented at 60Hz via
    /// [`Cpu::update_timers`], never inside the instruction loop.
    pub delay_timer: u8,
    pub sound_timer: u8,

    /// Written by the input collaborator before each update tick, indexed by
    /// hex key 0x0..=0xF.
    pub key_press_states: [bool; NUM_KEYS],

    /// Set by the EXIT instruction, surfaced to the host.
    pub should_exit: bool,

    /// Address of the 5-byte sprite for each hex digit, built once at
    /// font-load time.
    pub digit_sprite_locations: [u16; 16],

    instruction_set: InstructionRegistry,
    pub(crate) rng: ChaCha8Rng,
}

impl Cpu {
    /// Builds a CPU around `memory` and `monitor` and writes the font table
    /// into memory. The font survives [`Cpu::reset`] and ROM reloads.
    pub fn new(mut memory: Memory, monitor: Monitor) -> Self {
        memory.load_font();

        let mut digit_sprite_locations = [0u16; 16];
        for (digit, location) in digit_sprite_locations.iter_mut().enumerate() {
            *location = (START_FONT + digit * FONT_GLYPH_SIZE) as u16;
        }

        Cpu {
            memory,
            monitor,
            v: [0; NUM_REGISTERS],
            i: 0,
            pc: START_ROM as u16,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            key_press_states: [false; NUM_KEYS],
            should_exit: false,
            digit_sprite_locations,
            instruction_set: instructions::default_set(),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Reinitializes registers, stack, timers and the program counter. The
    /// memory contents, the font table and the framebuffer are untouched; a
    /// ROM has to be reloaded explicitly.
    pub fn reset(&mut self) {
        self.v = [0; NUM_REGISTERS];
        self.i = 0;
        self.pc = START_ROM as u16;
        self.sp = 0;
        self.stack = [0; STACK_DEPTH];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.key_press_states = [false; NUM_KEYS];
        self.should_exit = false;
    }

    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        self.memory.load_rom(bytes)
    }

    /// Makes the RND instruction deterministic, for tests and replays.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Reads the opcode at the program counter and advances past it.
    fn fetch_opcode(&mut self) -> Result<Opcode> {
        let opcode = self.memory.read_opcode(self.pc as usize)?;
        self.pc += 2;
        Ok(opcode)
    }

    /// Reads the opcode at the program counter without advancing.
    pub fn peek_opcode(&self) -> Result<Opcode> {
        self.memory.read_opcode(self.pc as usize)
    }

    pub fn opcode_at(&self, address: usize) -> Result<Opcode> {
        self.memory.read_opcode(address)
    }

    /// Returns the canonical mnemonic for the opcode at `address`, or `None`
    /// if the address is out of range or no handler maps the opcode. Purely
    /// a read, used by debugging tools.
    pub fn disassemble_instruction_at(&self, address: usize) -> Option<String> {
        let opcode = self.memory.read_opcode(address).ok()?;
        let instruction = self.instruction_set.resolve(opcode)?;
        Some((instruction.disassemble)(opcode))
    }

    /// Fetch, decode through the registry tree, execute. An opcode without a
    /// handler is fatal.
    pub fn step(&mut self) -> Result<()> {
        let opcode = self.fetch_opcode()?;

        let instruction = self
            .instruction_set
            .resolve(opcode)
            .ok_or(Error::UnimplementedOpcode(opcode.0))?;

        log::trace!("exec: {}", opcode);

        (instruction.execute)(self, opcode)
    }

    /// Runs until the program signals EXIT or a fatal condition occurs.
    pub fn run(&mut self) -> Result<()> {
        while !self.should_exit {
            self.step()?;
        }
        Ok(())
    }

    /// Executes up to `count` instructions, stopping early once EXIT has
    /// been signalled.
    pub fn run_cycles(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            if self.should_exit {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Steps until the deadline passes, checked only between full
    /// instructions, so the overshoot is at most one instruction.
    pub fn run_for(&mut self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;

        while Instant::now() < deadline && !self.should_exit {
            self.step()?;
        }
        Ok(())
    }

    /// Decrements the delay and sound timers toward zero. Intended to be
    /// invoked exactly once per 60Hz tick by the host, independent of the
    /// instruction stepping rate.
    pub fn update_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    pub(crate) fn push_stack(&mut self, address: u16) -> Result<()> {
        if self.sp >= STACK_DEPTH {
            return Err(Error::StackOverflow);
        }

        self.stack[self.sp] = address;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn pop_stack(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow);
        }

        self.sp -= 1;
        Ok(self.stack[self.sp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program;
    use claim::{assert_ok, assert_some_eq};

    fn create_cpu() -> Cpu {
        Cpu::new(Memory::new(), Monitor::new())
    }

    fn cpu_with_program(opcodes: &[u16]) -> Cpu {
        let mut cpu = create_cpu();
        for (index, &opcode) in opcodes.iter().enumerate() {
            cpu.memory.store_opcode(START_ROM + index * 2, opcode).unwrap();
        }
        cpu
    }

    #[test]
    fn test_load_rom_round_trips() {
        let rom: &[u8] = &[0x6A, 0x07, 0x12, 0x00];
        let mut cpu = create_cpu();

        cpu.load_rom(rom).unwrap();

        for (offset, &byte) in rom.iter().enumerate() {
            assert_eq!(cpu.memory.read_byte(START_ROM + offset).unwrap(), byte);
        }
    }

    #[test]
    fn test_step_executes_and_advances() {
        let mut cpu = cpu_with_program(&[program::load_value(0xA, 0x07)]);

        cpu.step().unwrap();

        assert_eq!(cpu.v[0xA], 0x07);
        assert_eq!(cpu.pc, 0x202);
    }

    #[test]
    fn test_step_fails_on_unmapped_opcode() {
        let mut cpu = cpu_with_program(&[0x00FF]);

        let result = cpu.step();

        assert_eq!(result, Err(Error::UnimplementedOpcode(0x00FF)));
    }

    #[test]
    fn test_jump() {
        let mut cpu = cpu_with_program(&[program::jump(0x250)]);
        cpu.memory.store_opcode(0x250, program::jump(0x200)).unwrap();

        assert_some_eq!(cpu.disassemble_instruction_at(0x200), "JP   0x250");
        assert_some_eq!(cpu.disassemble_instruction_at(0x250), "JP   0x200");

        cpu.run_cycles(1).unwrap();
        assert_eq!(cpu.pc, 0x250);

        cpu.run_cycles(1).unwrap();
        assert_eq!(cpu.pc, 0x200);
    }

    #[test]
    fn test_call_and_return() {
        let mut cpu = cpu_with_program(&[
            program::clear_screen(),
            program::call(0x250),
            program::jump(0x200),
        ]);
        cpu.memory.store_opcode(0x250, program::ret()).unwrap();

        assert_some_eq!(cpu.disassemble_instruction_at(0x200), "CLS");
        assert_some_eq!(cpu.disassemble_instruction_at(0x202), "CALL 0x250");
        assert_some_eq!(cpu.disassemble_instruction_at(0x250), "RET");

        cpu.run_cycles(1).unwrap();
        assert_eq!(cpu.pc, 0x202);

        cpu.run_cycles(1).unwrap();
        assert_eq!(cpu.pc, 0x250);
        assert_eq!(cpu.sp, 1);

        // RET lands on the instruction right after the CALL and restores
        // the stack pointer
        cpu.run_cycles(1).unwrap();
        assert_eq!(cpu.pc, 0x204);
        assert_eq!(cpu.sp, 0);

        cpu.run_cycles(1).unwrap();
        assert_eq!(cpu.pc, 0x200);
    }

    #[test]
    fn test_run_stops_at_exit() {
        let mut cpu = cpu_with_program(&[
            program::load_value(0x1, 0x42),
            program::se_value(0x1, 0x42),
            program::load_value(0x2, 0xFF),
            program::exit(),
        ]);

        cpu.run().unwrap();

        // the skip jumped over the second load
        assert_eq!(cpu.v[0x2], 0);
        assert!(cpu.should_exit);
    }

    #[test]
    fn test_run_takes_unskipped_branch() {
        let mut cpu = cpu_with_program(&[
            program::load_value(0x1, 0x42),
            program::sne_value(0x1, 0x42),
            program::load_value(0x2, 0xFF),
            program::exit(),
        ]);

        cpu.run().unwrap();

        assert_eq!(cpu.v[0x2], 0xFF);
    }

    #[test]
    fn test_run_cycles_stops_after_exit() {
        let mut cpu = cpu_with_program(&[program::exit()]);

        // only the first cycle executes, the rest are skipped
        assert_ok!(cpu.run_cycles(10));
        assert_eq!(cpu.pc, 0x202);
    }

    #[test]
    fn test_run_for_stops_at_exit() {
        let mut cpu = cpu_with_program(&[program::exit()]);

        assert_ok!(cpu.run_for(Duration::from_millis(50)));
        assert!(cpu.should_exit);
    }

    #[test]
    fn test_stack_overflow() {
        // a subroutine that endlessly calls itself
        let mut cpu = cpu_with_program(&[program::call(0x200)]);

        let result = cpu.run_cycles(STACK_DEPTH + 1);

        assert_eq!(result, Err(Error::StackOverflow));
    }

    #[test]
    fn test_stack_underflow() {
        let mut cpu = cpu_with_program(&[program::ret()]);

        assert_eq!(cpu.step(), Err(Error::StackUnderflow));
    }

    #[test]
    fn test_update_timers_decrements_to_zero() {
        let mut cpu = create_cpu();
        cpu.delay_timer = 2;
        cpu.sound_timer = 1;

        cpu.update_timers();
        assert_eq!(cpu.delay_timer, 1);
        assert_eq!(cpu.sound_timer, 0);

        cpu.update_timers();
        cpu.update_timers();
        assert_eq!(cpu.delay_timer, 0);
        assert_eq!(cpu.sound_timer, 0);
    }

    #[test]
    fn test_key_wait_retries_until_key_press() {
        // Fx0A followed by nothing; PC must not move while no key is down
        let mut cpu = cpu_with_program(&[0xF30A]);

        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.pc, 0x200);

        cpu.key_press_states[0xB] = true;
        cpu.step().unwrap();

        assert_eq!(cpu.v[0x3], 0xB);
        assert_eq!(cpu.pc, 0x202);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let cpu = cpu_with_program(&[program::jump(0x250)]);

        assert_eq!(cpu.peek_opcode().unwrap(), Opcode(0x1250));
        assert_eq!(cpu.pc, 0x200);
    }

    #[test]
    fn test_disassemble_unknown_opcode_is_none() {
        let cpu = cpu_with_program(&[0x00FF]);

        assert!(cpu.disassemble_instruction_at(0x200).is_none());
        assert!(cpu.disassemble_instruction_at(0xFFF).is_none());
    }

    #[test]
    fn test_font_is_loaded_and_survives_reset() {
        let mut cpu = create_cpu();

        assert_eq!(cpu.digit_sprite_locations[0x0], 0x050);
        assert_eq!(cpu.digit_sprite_locations[0xF], 0x09B);
        assert_eq!(cpu.memory.read_byte(0x050).unwrap(), 0xF0);

        cpu.v[0x3] = 0xAB;
        cpu.pc = 0x300;
        cpu.sp = 2;
        cpu.delay_timer = 9;
        cpu.reset();

        assert_eq!(cpu.v[0x3], 0);
        assert_eq!(cpu.pc, 0x200);
        assert_eq!(cpu.sp, 0);
        assert_eq!(cpu.delay_timer, 0);
        // the font table is not cleared by a CPU reset
        assert_eq!(cpu.memory.read_byte(0x050).unwrap(), 0xF0);
    }
}
