//! Opcode builders for assembling small programs in tests and tooling,
//! typically combined with [`crate::memory::Memory::store_opcode`].

pub fn clear_screen() -> u16 {
    0x00E0
}

pub fn ret() -> u16 {
    0x00EE
}

pub fn exit() -> u16 {
    0x00FD
}

pub fn jump(address: u16) -> u16 {
    0x1000 | (address & 0x0FFF)
}

pub fn call(address: u16) -> u16 {
    0x2000 | (address & 0x0FFF)
}

pub fn se_value(register: u8, value: u8) -> u16 {
    0x3000 | reg_x(register) | value as u16
}

pub fn sne_value(register: u8, value: u8) -> u16 {
    0x4000 | reg_x(register) | value as u16
}

pub fn se_register(register_x: u8, register_y: u8) -> u16 {
    0x5000 | reg_x(register_x) | reg_y(register_y)
}

pub fn load_value(register: u8, value: u8) -> u16 {
    0x6000 | reg_x(register) | value as u16
}

pub fn add_value(register: u8, value: u8) -> u16 {
    0x7000 | reg_x(register) | value as u16
}

pub fn load_register(register_x: u8, register_y: u8) -> u16 {
    0x8000 | reg_x(register_x) | reg_y(register_y)
}

pub fn or(register_x: u8, register_y: u8) -> u16 {
    0x8001 | reg_x(register_x) | reg_y(register_y)
}

pub fn and(register_x: u8, register_y: u8) -> u16 {
    0x8002 | reg_x(register_x) | reg_y(register_y)
}

pub fn xor(register_x: u8, register_y: u8) -> u16 {
    0x8003 | reg_x(register_x) | reg_y(register_y)
}

pub fn add_register(register_x: u8, register_y: u8) -> u16 {
    0x8004 | reg_x(register_x) | reg_y(register_y)
}

pub fn sub_register(register_x: u8, register_y: u8) -> u16 {
    0x8005 | reg_x(register_x) | reg_y(register_y)
}

pub fn shift_right(register: u8) -> u16 {
    0x8006 | reg_x(register)
}

pub fn subn_register(register_x: u8, register_y: u8) -> u16 {
    0x8007 | reg_x(register_x) | reg_y(register_y)
}

pub fn shift_left(register: u8) -> u16 {
    0x800E | reg_x(register)
}

pub fn sne_register(register_x: u8, register_y: u8) -> u16 {
    0x9000 | reg_x(register_x) | reg_y(register_y)
}

pub fn load_i(address: u16) -> u16 {
    0xA000 | (address & 0x0FFF)
}

pub fn draw(register_x: u8, register_y: u8, height: u8) -> u16 {
    0xD000 | reg_x(register_x) | reg_y(register_y) | (height & 0x0F) as u16
}

fn reg_x(register: u8) -> u16 {
    ((register & 0x0F) as u16) << 8
}

fn reg_y(register: u8) -> u16 {
    ((register & 0x0F) as u16) << 4
}
