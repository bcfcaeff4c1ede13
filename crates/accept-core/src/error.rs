//! Error taxonomy of the device.
//!
//! Every variant is recoverable: link errors feed the reconnection loop,
//! transport errors are shown once and the device returns to Ready.

use core::fmt;

/// Association did not come up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkError {
    /// The radio refused to start association.
    StartFailed,
    /// Status never reported connected within the poll ceiling.
    Timeout { attempts: u8 },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFailed => f.write_str("association could not start"),
            Self::Timeout { attempts } => {
                write!(f, "not connected after {attempts} status polls")
            }
        }
    }
}

/// The accept request got no usable HTTP response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportError {
    /// No complete response within the request timeout.
    Timeout,
    /// Host name could not be resolved.
    Dns,
    /// TCP connection could not be opened.
    Connect,
    /// Socket read or write failed after connecting.
    Io,
    /// Peer answered with something that is not an HTTP/1.x response.
    MalformedResponse,
}

impl TransportError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "read timeout",
            Self::Dns => "dns lookup failed",
            Self::Connect => "connection refused",
            Self::Io => "send/receive failed",
            Self::MalformedResponse => "malformed response",
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
