use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use minifb::{Key, Scale, Window, WindowOptions};

use chip8::cpu::Cpu;
use chip8::memory::Memory;
use chip8::monitor::Monitor;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path of the rom to load
    #[arg(short, long, value_name = "FILE")]
    rom_path: PathBuf,

    /// Instructions executed per 60Hz tick
    #[arg(short, long, default_value_t = 8)]
    cycles_per_tick: usize,
}

/// Maps the left-hand block of a QWERTY keyboard onto the 16-key hex pad.
fn keymap() -> HashMap<Key, u8> {
    HashMap::from([
        (Key::Key1, 0x1),
        (Key::Key2, 0x2),
        (Key::Key3, 0x3),
        (Key::Key4, 0xC),
        (Key::Q, 0x4),
        (Key::W, 0x5),
        (Key::E, 0x6),
        (Key::R, 0xD),
        (Key::A, 0x7),
        (Key::S, 0x8),
        (Key::D, 0x9),
        (Key::F, 0xE),
        (Key::Y, 0xA),
        (Key::X, 0x0),
        (Key::C, 0xB),
        (Key::V, 0xF),
    ])
}

fn run_rom(bytes: &[u8], cycles_per_tick: usize) -> anyhow::Result<()> {
    let mut cpu = Cpu::new(Memory::new(), Monitor::new());
    cpu.load_rom(bytes)?;

    let width = cpu.monitor.width();
    let height = cpu.monitor.height();
    let mut buffer: Vec<u32> = vec![0; width * height];

    let mut opts = WindowOptions::default();
    opts.scale = Scale::X16;

    let mut window = Window::new("Chip-8 - ESC to exit", width, height, opts)?;

    // Limit to max ~60 fps update rate
    window.limit_update_rate(Some(Duration::from_micros(16600)));

    let keymap = keymap();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // the input collaborator rewrites all 16 key states before the tick
        cpu.key_press_states = [false; 16];
        for key in window.get_keys() {
            if let Some(&keycode) = keymap.get(&key) {
                cpu.key_press_states[keycode as usize] = true;
            }
        }

        cpu.update_timers();
        cpu.run_cycles(cycles_per_tick)?;

        if cpu.should_exit {
            break;
        }

        for (target, &pixel) in buffer.iter_mut().zip(cpu.monitor.pixels()) {
            *target = if pixel != 0 { 0xFFFFFF } else { 0 };
        }

        window.update_with_buffer(&buffer, width, height)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.rom_path)
        .with_context(|| format!("could not read rom {}", cli.rom_path.display()))?;

    run_rom(&bytes, cli.cycles_per_tick)
}
