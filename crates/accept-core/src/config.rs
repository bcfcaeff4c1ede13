//! Compile-time network settings and device timing.

/// Default server port used when the build does not override it.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Station credentials plus the accept endpoint.
///
/// Supplied once at startup and never mutated afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NetworkConfig {
    pub ssid: &'static str,
    pub password: &'static str,
    pub host: &'static str,
    pub port: u16,
}

impl NetworkConfig {
    pub const fn new(
        ssid: &'static str,
        password: &'static str,
        host: &'static str,
        port: u16,
    ) -> Self {
        Self {
            ssid,
            password,
            host,
            port,
        }
    }
}

/// Timing knobs of the device loop, all in milliseconds unless noted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timing {
    pub debounce_ms: u64,
    pub link_poll_interval_ms: u32,
    pub link_poll_attempts: u8,
    pub link_fail_pause_ms: u32,
    pub request_timeout_ms: u64,
    pub settle_ms: u32,
    pub blink_phase_ms: u32,
    /// Number of clear/redraw cycles played for a successful accept.
    pub blink_cycles: u8,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            debounce_ms: 1_000,
            link_poll_interval_ms: 500,
            link_poll_attempts: 30,
            link_fail_pause_ms: 3_000,
            request_timeout_ms: 5_000,
            settle_ms: 1_000,
            blink_phase_ms: 100,
            blink_cycles: 2,
        }
    }
}

impl Timing {
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub const fn with_link_poll(mut self, interval_ms: u32, attempts: u8) -> Self {
        self.link_poll_interval_ms = interval_ms;
        self.link_poll_attempts = attempts;
        self
    }

    pub const fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }

    pub const fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Upper bound of a single `connect()` call, excluding association start.
    pub const fn link_ceiling_ms(&self) -> u64 {
        self.link_poll_interval_ms as u64 * self.link_poll_attempts as u64
    }
}

/// Parses a decimal TCP port at compile time.
///
/// Returns `None` for empty input, non-digits, zero or values above `u16::MAX`.
pub const fn parse_port(raw: &str) -> Option<u16> {
    let bytes = raw.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + (b - b'0') as u32;
        if value > u16::MAX as u32 {
            return None;
        }
        i += 1;
    }

    if value == 0 { None } else { Some(value as u16) }
}

/// Like [`parse_port`], falling back to [`DEFAULT_SERVER_PORT`] when the
/// variable is unset or unparsable.
pub const fn port_or_default(raw: Option<&str>) -> u16 {
    match raw {
        Some(raw) => match parse_port(raw) {
            Some(port) => port,
            None => DEFAULT_SERVER_PORT,
        },
        None => DEFAULT_SERVER_PORT,
    }
}
