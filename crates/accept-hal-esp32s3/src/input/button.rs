use embedded_hal::digital::InputPin;

use accept_core::input::{InputEvent, InputProvider};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    stable_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            stable_polls: 3,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    /// Consecutive equal reads required before a level change counts.
    pub const fn with_stable_polls(mut self, stable_polls: u8) -> Self {
        self.stable_polls = stable_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<PinErr> {
    Pin(PinErr),
}

/// Single momentary button reporting a press on the released-to-pressed
/// edge once the level has been stable for a few polls.
#[derive(Debug)]
pub struct ButtonInput<PIN> {
    pin: PIN,
    config: ButtonConfig,
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl<PIN> ButtonInput<PIN>
where
    PIN: InputPin,
{
    /// A button already held at construction does not report a press until
    /// it is released and pressed again.
    pub fn new(mut pin: PIN, config: ButtonConfig) -> Result<Self, ButtonInputError<PIN::Error>> {
        let high = pin.is_high().map_err(ButtonInputError::Pin)?;
        let pressed = pressed_from_level(high, config.active_low);

        Ok(Self {
            pin,
            config,
            raw: pressed,
            stable: pressed,
            stable_count: 0,
        })
    }

    pub fn is_pressed(&self) -> bool {
        self.stable
    }
}

impl<PIN> InputProvider for ButtonInput<PIN>
where
    PIN: InputPin,
{
    type Error = ButtonInputError<PIN::Error>;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        let high = self.pin.is_high().map_err(ButtonInputError::Pin)?;
        let pressed = pressed_from_level(high, self.config.active_low);

        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        let threshold = self.config.stable_polls.max(1);
        if self.stable_count >= threshold && self.stable != self.raw {
            self.stable = self.raw;
            if self.stable {
                return Ok(Some(InputEvent::Press));
            }
        }

        Ok(None)
    }
}

#[inline]
fn pressed_from_level(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}
