//! HTTP/1.1 framing for a single request/response over any byte stream.

use core::fmt::Write as _;

use embedded_io_async::{Read, Write};

use super::{AcceptRequest, HttpResponse};
use crate::error::TransportError;

pub const REQUEST_HEAD_BYTES: usize = 256;

pub type RequestHead = heapless::String<REQUEST_HEAD_BYTES>;

/// Writes the request line and headers, terminated by the blank line.
pub fn write_request<W: core::fmt::Write>(
    request: &AcceptRequest<'_>,
    out: &mut W,
) -> core::fmt::Result {
    write!(out, "{} {} HTTP/1.1\r\n", request.method, request.path)?;
    write!(out, "Host: {}:{}\r\n", request.host, request.port)?;
    write!(out, "Content-Type: {}\r\n", request.content_type)?;
    write!(out, "Content-Length: {}\r\n", request.body.len())?;
    out.write_str("Connection: close\r\n\r\n")
}

/// Offset of the `\r\n\r\n` separator.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Status code from `HTTP/1.x NNN reason`.
pub fn parse_status_line(head: &[u8]) -> Option<u16> {
    let line_end = head
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(head.len());
    let line = core::str::from_utf8(&head[..line_end]).ok()?;

    let mut parts = line.split(' ');
    let version = parts.next()?;
    if !version.starts_with("HTTP/1.") {
        return None;
    }

    let code = parts.next()?;
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

/// `Content-Length` from a header block, `None` when absent.
pub fn parse_content_length(head: &str) -> Result<Option<usize>, TransportError> {
    for line in head.split("\r\n").skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            return value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| TransportError::MalformedResponse);
        }
    }
    Ok(None)
}

/// Parsed status line and framing of a buffered response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResponseHead {
    pub status: u16,
    pub body_start: usize,
    pub content_length: Option<usize>,
}

impl ResponseHead {
    /// True once `filled` bytes hold the whole declared body.
    ///
    /// Without `Content-Length` the body ends at connection close.
    pub fn is_complete(&self, filled: usize) -> bool {
        self.content_length
            .is_some_and(|len| filled >= self.body_start + len)
    }

    /// Borrows the body out of `buf`, clipped to the declared length.
    pub fn response<'b>(&self, buf: &'b [u8]) -> HttpResponse<'b> {
        let start = self.body_start.min(buf.len());
        let end = match self.content_length {
            Some(len) => (start + len).min(buf.len()),
            None => buf.len(),
        };
        HttpResponse {
            status: self.status,
            body: &buf[start..end],
        }
    }
}

/// Parses the head of a buffered response.
///
/// `Ok(None)` means the header block is not complete yet.
pub fn parse_head(buf: &[u8]) -> Result<Option<ResponseHead>, TransportError> {
    let Some(end) = find_header_end(buf) else {
        return Ok(None);
    };

    let head = core::str::from_utf8(&buf[..end]).map_err(|_| TransportError::MalformedResponse)?;
    let status = parse_status_line(head.as_bytes()).ok_or(TransportError::MalformedResponse)?;
    let content_length = parse_content_length(head)?;

    Ok(Some(ResponseHead {
        status,
        body_start: end + 4,
        content_length,
    }))
}

/// Writes `request` to `stream` and reads the response into `buf`.
///
/// Reading stops at connection close, at the end of a declared body, or
/// when `buf` is full. A head that overflows `buf` yields its status with
/// an empty body. No timeout is applied here; callers wrap the call.
pub async fn exchange<'b, S>(
    stream: &mut S,
    request: &AcceptRequest<'_>,
    buf: &'b mut [u8],
) -> Result<HttpResponse<'b>, TransportError>
where
    S: Read + Write,
{
    let mut head = RequestHead::new();
    write_request(request, &mut head).map_err(|_| TransportError::Io)?;

    stream
        .write_all(head.as_bytes())
        .await
        .map_err(|_| TransportError::Io)?;
    if !request.body.is_empty() {
        stream
            .write_all(request.body)
            .await
            .map_err(|_| TransportError::Io)?;
    }
    stream.flush().await.map_err(|_| TransportError::Io)?;

    let mut filled = 0usize;
    while filled < buf.len() {
        let n = stream
            .read(&mut buf[filled..])
            .await
            .map_err(|_| TransportError::Io)?;
        if n == 0 {
            break;
        }
        filled += n;

        if parse_head(&buf[..filled])?.is_some_and(|head| head.is_complete(filled)) {
            break;
        }
    }

    let buf: &'b [u8] = buf;
    match parse_head(&buf[..filled])? {
        Some(head) => Ok(head.response(&buf[..filled])),
        // Header block larger than `buf`: the status line alone decides.
        None if filled == buf.len() => {
            let status = parse_status_line(buf).ok_or(TransportError::MalformedResponse)?;
            Ok(HttpResponse { status, body: &[] })
        }
        None => Err(TransportError::MalformedResponse),
    }
}
