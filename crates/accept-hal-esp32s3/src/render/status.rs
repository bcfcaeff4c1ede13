//! Status screen layout: color bar, headline, optional detail line.

use accept_core::render::{StatusColor, StatusView};
use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::{Rgb565, raw::RawU16},
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use gc9107::{FrameBuffer, protocol};

use super::FrameRenderer;

const BAR_HEIGHT: u32 = 20;
const HEADLINE_ORIGIN: Point = Point::new(10, 50);
const DETAIL_ORIGIN: Point = Point::new(5, 100);

pub fn status_rgb565(color: StatusColor) -> Rgb565 {
    Rgb565::from(RawU16::new(protocol::rgb888_to_rgb565(color.rgb888())))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StatusRenderer;

impl StatusRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl FrameRenderer for StatusRenderer {
    fn render(&mut self, view: &StatusView, frame: &mut FrameBuffer) {
        frame.fill(0);

        let bar = Rectangle::new(
            Point::zero(),
            Size::new(protocol::WIDTH as u32, BAR_HEIGHT),
        );
        let _ = bar
            .into_styled(PrimitiveStyle::with_fill(status_rgb565(view.color)))
            .draw(frame);

        let headline_style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
        let _ = Text::with_baseline(view.headline, HEADLINE_ORIGIN, headline_style, Baseline::Top)
            .draw(frame);

        if let Some(detail) = view.detail.as_deref() {
            let detail_style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
            let _ = Text::with_baseline(detail, DETAIL_ORIGIN, detail_style, Baseline::Top)
                .draw(frame);
        }
    }
}
