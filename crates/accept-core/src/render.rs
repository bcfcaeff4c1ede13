//! Device-state to panel mapping and the success blink.

use embedded_hal_async::delay::DelayNs;
use log::warn;

use crate::{
    app::{DeviceState, ErrorCause},
    config::Timing,
};

pub const DETAIL_BYTES: usize = 48;

pub type DetailLine = heapless::String<DETAIL_BYTES>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusColor {
    Off,
    Yellow,
    Green,
    Blue,
    Cyan,
    Red,
}

impl StatusColor {
    /// 24-bit `0xRRGGBB` value of the status bar.
    pub const fn rgb888(self) -> u32 {
        match self {
            Self::Off => 0x00_00_00,
            Self::Yellow => 0xFF_FF_00,
            Self::Green => 0x00_FF_00,
            Self::Blue => 0x00_00_FF,
            Self::Cyan => 0x00_FF_FF,
            Self::Red => 0xFF_00_00,
        }
    }
}

/// What the panel shows for one state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusView {
    pub color: StatusColor,
    pub headline: &'static str,
    pub detail: Option<DetailLine>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Animation {
    Static,
    Blink { cycles: u8, phase_ms: u32 },
}

impl Animation {
    pub const fn steps(self) -> AnimationSteps {
        AnimationSteps {
            animation: self,
            index: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameStep {
    Draw,
    Clear,
    Hold(u32),
}

/// Frame sequence of an [`Animation`]: one draw, then per blink cycle
/// hold, clear, hold, draw.
#[derive(Clone, Debug)]
pub struct AnimationSteps {
    animation: Animation,
    index: u16,
}

impl Iterator for AnimationSteps {
    type Item = FrameStep;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        let step = match self.animation {
            Animation::Static => (index == 0).then_some(FrameStep::Draw),
            Animation::Blink { cycles, phase_ms } => {
                let total = 1 + 4 * u16::from(cycles);
                if index >= total {
                    None
                } else if index == 0 {
                    Some(FrameStep::Draw)
                } else {
                    Some(match (index - 1) % 4 {
                        0 | 2 => FrameStep::Hold(phase_ms),
                        1 => FrameStep::Clear,
                        _ => FrameStep::Draw,
                    })
                }
            }
        };
        if step.is_some() {
            self.index = index.saturating_add(1);
        }
        step
    }
}

/// Single writer of the status panel.
pub trait StatusSurface {
    type Error: core::fmt::Debug;

    /// Repaints the whole panel with `view`.
    fn show(&mut self, view: &StatusView) -> Result<(), Self::Error>;

    /// Blanks the panel.
    fn clear(&mut self) -> Result<(), Self::Error>;
}

pub struct DisplayController<S> {
    surface: S,
    host: &'static str,
    blink_cycles: u8,
    blink_phase_ms: u32,
    fault_logged: bool,
}

impl<S: StatusSurface> DisplayController<S> {
    pub const fn new(surface: S, host: &'static str, timing: &Timing) -> Self {
        Self {
            surface,
            host,
            blink_cycles: timing.blink_cycles,
            blink_phase_ms: timing.blink_phase_ms,
            fault_logged: false,
        }
    }

    pub fn view(&self, state: DeviceState) -> StatusView {
        let (color, headline) = match state {
            DeviceState::Booting => (StatusColor::Off, "Booting"),
            DeviceState::Connecting => (StatusColor::Yellow, "Connecting"),
            DeviceState::Ready => (StatusColor::Green, "Ready"),
            DeviceState::Sending => (StatusColor::Blue, "Sending"),
            DeviceState::Success => (StatusColor::Cyan, "Accepted!"),
            DeviceState::Error(ErrorCause::Link) => (StatusColor::Red, "WiFi Fail"),
            DeviceState::Error(ErrorCause::Transport) => (StatusColor::Red, "Failed"),
            DeviceState::Error(ErrorCause::Http(_)) => (StatusColor::Red, "Error"),
            DeviceState::LinkLost => (StatusColor::Red, "WiFi Lost"),
        };

        let detail = match state {
            DeviceState::Ready => Some(host_line(self.host)),
            _ => None,
        };

        StatusView {
            color,
            headline,
            detail,
        }
    }

    pub const fn animation(&self, state: DeviceState) -> Animation {
        match state {
            DeviceState::Success => Animation::Blink {
                cycles: self.blink_cycles,
                phase_ms: self.blink_phase_ms,
            },
            _ => Animation::Static,
        }
    }

    /// Plays the frames for `state`. Surface failures are logged once and
    /// otherwise ignored.
    pub async fn render<D: DelayNs>(&mut self, state: DeviceState, delay: &mut D) {
        let view = self.view(state);
        for step in self.animation(state).steps() {
            let result = match step {
                FrameStep::Draw => self.surface.show(&view),
                FrameStep::Clear => self.surface.clear(),
                FrameStep::Hold(ms) => {
                    delay.delay_ms(ms).await;
                    Ok(())
                }
            };

            if let Err(err) = result {
                if !self.fault_logged {
                    warn!("display: surface write failed: {:?}", err);
                    self.fault_logged = true;
                }
            }
        }
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

/// `-> {host}`, cut at a char boundary when the host is too long.
fn host_line(host: &str) -> DetailLine {
    let mut line = DetailLine::new();
    let _ = line.push_str("-> ");
    for ch in host.chars() {
        if line.push(ch).is_err() {
            break;
        }
    }
    line
}
