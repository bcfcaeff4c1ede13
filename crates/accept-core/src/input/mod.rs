//! Input abstraction layer.

mod debounce;

pub use debounce::InputDebouncer;

/// Raw edges reported by the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    /// Button went from released to pressed.
    Press,
}

/// Polled input provider.
pub trait InputProvider {
    type Error: core::fmt::Debug;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}
