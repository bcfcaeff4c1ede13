/// Accepts at most one press per debounce window.
///
/// Bounce and rapid re-triggers are dropped without any release tracking:
/// an edge counts only when at least `window_ms` passed since the last
/// accepted one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InputDebouncer {
    window_ms: u64,
    last_accepted_ms: Option<u64>,
}

impl InputDebouncer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// Returns `true` when the edge at `now_ms` is an accepted press.
    ///
    /// Rejected edges leave the state untouched, so a burst never extends
    /// its own window.
    pub fn on_edge(&mut self, now_ms: u64) -> bool {
        let accepted = match self.last_accepted_ms {
            None => true,
            Some(last) => now_ms >= last && now_ms - last >= self.window_ms,
        };

        if accepted {
            self.last_accepted_ms = Some(now_ms);
        }
        accepted
    }

    pub const fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }

    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }
}
