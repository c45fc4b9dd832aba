use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type used throughout this library. Every variant is fatal for
/// the current program: the host decides whether to halt, reset or reload.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The ROM does not fit between 0x200 and the end of memory.
    RomTooLarge(usize),
    /// No instruction handler resolved for the opcode.
    UnimplementedOpcode(u16),
    /// A memory access outside of 0x000..=0xFFF.
    AddressOutOfBounds(usize),
    /// CALL beyond the 16 stack slots.
    StackOverflow,
    /// RET with an empty stack.
    StackUnderflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RomTooLarge(size) => {
                write!(f, "rom with size {} bytes does not fit into memory", size)
            }
            Error::UnimplementedOpcode(opcode) => {
                write!(f, "opcode 0x{:04X} not implemented", opcode)
            }
            Error::AddressOutOfBounds(address) => {
                write!(f, "memory access at 0x{:04X} is out of bounds", address)
            }
            Error::StackOverflow => write!(f, "call stack overflow, depth limit is 16"),
            Error::StackUnderflow => write!(f, "return with an empty call stack"),
        }
    }
}

impl std::error::Error for Error {}
