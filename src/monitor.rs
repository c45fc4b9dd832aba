pub const MONITOR_WIDTH: usize = 64;
pub const MONITOR_HEIGHT: usize = 32;

/// The 64x32 pixel framebuffer.
///
/// Each cell holds a packed intensity byte, addressed as `x + y * width`.
/// Coordinates wrap modulo width/height, sprites are allowed to run off one
/// screen edge and reappear on the opposite one. The only read-modify-write
/// operation available to the CPU is the XOR blit in [`Monitor::draw_sprite`].
pub struct Monitor {
    pixels: [u8; MONITOR_WIDTH * MONITOR_HEIGHT],
}

impl Monitor {
    pub fn new() -> Self {
        Monitor {
            pixels: [0; MONITOR_WIDTH * MONITOR_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[self.compute_idx(x, y)]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        let idx = self.compute_idx(x, y);
        self.pixels[idx] = value;
    }

    /// XOR-blits a sprite at (`x`, `y`), one byte per row, most significant
    /// bit first. Returns `true` if any pixel was switched from on to off,
    /// the collision flag the draw instruction stores in VF.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            for col in 0..8 {
                if byte & (0x80 >> col) == 0 {
                    continue;
                }

                let idx = self.compute_idx(x + col, y + row);
                self.pixels[idx] ^= 1;

                if self.pixels[idx] == 0 {
                    collision = true;
                }
            }
        }

        collision
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        MONITOR_WIDTH
    }

    pub fn height(&self) -> usize {
        MONITOR_HEIGHT
    }

    fn compute_idx(&self, x: usize, y: usize) -> usize {
        (x % MONITOR_WIDTH) + (y % MONITOR_HEIGHT) * MONITOR_WIDTH
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}
