//! Command set and wire encoding for the GC9107 controller.

/// Visible panel width in pixels.
pub const WIDTH: usize = 128;
/// Visible panel height in pixels.
pub const HEIGHT: usize = 128;
/// Bytes of one RGB565 row on the wire.
pub const ROW_BYTES: usize = WIDTH * 2;
/// Pixels in a full frame.
pub const FRAME_PIXELS: usize = WIDTH * HEIGHT;

pub const SWRESET: u8 = 0x01;
pub const SLPOUT: u8 = 0x11;
pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const DISPON: u8 = 0x29;
pub const CASET: u8 = 0x2A;
pub const RASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const MADCTL: u8 = 0x36;
pub const COLMOD: u8 = 0x3A;
/// Inter register enable 1 and 2; vendor registers are locked without them.
pub const INTER_REG_EN1: u8 = 0xFE;
pub const INTER_REG_EN2: u8 = 0xEF;

/// `COLMOD` value for 16 bits per pixel.
pub const COLMOD_RGB565: u8 = 0x05;
/// `MADCTL` bit selecting BGR subpixel order.
pub const MADCTL_BGR: u8 = 0x08;

/// One command of the power-up sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InitStep {
    pub command: u8,
    pub params: &'static [u8],
    /// Wait after the command before sending the next one.
    pub delay_ms: u32,
}

const fn step(command: u8, params: &'static [u8], delay_ms: u32) -> InitStep {
    InitStep {
        command,
        params,
        delay_ms,
    }
}

/// Power-up sequence after a hardware reset, ending with the panel on.
///
/// `MADCTL` and inversion are sent separately from [`crate::Config`].
pub const INIT_SEQUENCE: &[InitStep] = &[
    step(INTER_REG_EN1, &[], 0),
    step(INTER_REG_EN2, &[], 0),
    step(0xB0, &[0xC0], 0),
    step(0xB2, &[0x2F], 0),
    step(0xB3, &[0x03], 0),
    step(0xB6, &[0x19], 0),
    step(0xB7, &[0x01], 0),
    step(0xAC, &[0xCB], 0),
    step(0xAB, &[0x0E], 0),
    step(0xB4, &[0x04], 0),
    step(0xA8, &[0x19], 0),
    step(0xB8, &[0x08], 0),
    step(0xE8, &[0x24], 0),
    step(0xE9, &[0x48], 0),
    step(0xEA, &[0x22], 0),
    step(0xC6, &[0x30], 0),
    step(0xC7, &[0x18], 0),
    step(COLMOD, &[COLMOD_RGB565], 0),
    step(SLPOUT, &[], 120),
    step(DISPON, &[], 20),
];

/// Encodes a `CASET`/`RASET` parameter block: start and end, big-endian.
///
/// Returns `None` when `start > end` or `end` lies past `limit`.
#[inline]
pub fn encode_address_window(start: u16, end: u16, offset: u16, limit: u16) -> Option<[u8; 4]> {
    if start > end || end >= limit {
        return None;
    }

    let start = (start + offset).to_be_bytes();
    let end = (end + offset).to_be_bytes();
    Some([start[0], start[1], end[0], end[1]])
}

/// RGB565 pixel as sent on the wire: high byte first.
#[inline]
pub const fn encode_pixel(raw: u16) -> [u8; 2] {
    raw.to_be_bytes()
}

/// Packs a `0xRRGGBB` color into RGB565.
#[inline]
pub const fn rgb888_to_rgb565(rgb: u32) -> u16 {
    let r = ((rgb >> 16) & 0xFF) as u16;
    let g = ((rgb >> 8) & 0xFF) as u16;
    let b = (rgb & 0xFF) as u16;
    ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)
}
