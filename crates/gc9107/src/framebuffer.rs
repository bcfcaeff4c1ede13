//! In-memory RGB565 framebuffer for the 128x128 panel.

use crate::protocol::{FRAME_PIXELS, HEIGHT, ROW_BYTES, WIDTH, encode_pixel};

/// Full-frame RGB565 buffer, row-major.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: [u16; FRAME_PIXELS],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates a black framebuffer.
    pub const fn new() -> Self {
        Self {
            pixels: [0u16; FRAME_PIXELS],
        }
    }

    pub fn pixels(&self) -> &[u16; FRAME_PIXELS] {
        &self.pixels
    }

    /// Fills the whole frame with one raw RGB565 value.
    pub fn fill(&mut self, raw: u16) {
        self.pixels.fill(raw);
    }

    /// Returns `true` when the pixel is in bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, raw: u16) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }

        self.pixels[y * WIDTH + x] = raw;
        true
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u16> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        Some(self.pixels[y * WIDTH + x])
    }

    /// Fills a rectangle, clipped to the panel.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, raw: u16) {
        let x_end = x.saturating_add(width).min(WIDTH);
        let y_end = y.saturating_add(height).min(HEIGHT);
        if x >= x_end || y >= y_end {
            return;
        }

        for row in y..y_end {
            self.pixels[row * WIDTH + x..row * WIDTH + x_end].fill(raw);
        }
    }

    /// Serializes row `y` into wire order.
    ///
    /// Returns `false` for rows past the panel.
    pub fn encode_row(&self, y: usize, out: &mut [u8; ROW_BYTES]) -> bool {
        if y >= HEIGHT {
            return false;
        }

        let row = &self.pixels[y * WIDTH..(y + 1) * WIDTH];
        for (chunk, raw) in out.chunks_exact_mut(2).zip(row) {
            chunk.copy_from_slice(&encode_pixel(*raw));
        }
        true
    }
}
