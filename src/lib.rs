pub mod cpu;
pub mod error;
pub mod instructions;
pub mod memory;
pub mod monitor;
pub mod opcode;
pub mod program;
pub mod registry;

pub use error::{Error, Result};

/// First address a ROM is loaded at. Everything below is reserved for the
/// interpreter, most notably the font table at [`START_FONT`].
pub const START_ROM: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
pub const ROM_SIZE: usize = MEMORY_SIZE - START_ROM;

/// Start of the built-in hex digit sprites, 16 glyphs of 5 bytes each
/// (0x050..=0x09F).
pub const START_FONT: usize = 0x050;
pub const FONT_GLYPH_SIZE: usize = 5;

pub const FONT_DATA: &[u8] = &[
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
