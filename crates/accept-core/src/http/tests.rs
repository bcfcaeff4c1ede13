use std::{collections::VecDeque, string::String, vec::Vec};

use embassy_futures::block_on;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use super::*;
use crate::testing::{CONFIG, FakeTransport, VirtualClock};

/// In-memory socket that hands the response back in fixed-size chunks.
struct ChunkedStream {
    written: Vec<u8>,
    incoming: VecDeque<u8>,
    chunk: usize,
    reads: usize,
    fail_reads: bool,
}

impl ChunkedStream {
    fn new(response: &[u8], chunk: usize) -> Self {
        Self {
            written: Vec::new(),
            incoming: response.iter().copied().collect(),
            chunk,
            reads: 0,
            fail_reads: false,
        }
    }

    fn written_text(&self) -> String {
        String::from_utf8(self.written.clone()).unwrap()
    }
}

impl ErrorType for ChunkedStream {
    type Error = ErrorKind;
}

impl Read for ChunkedStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(ErrorKind::ConnectionReset);
        }
        self.reads += 1;
        let n = self.chunk.min(buf.len()).min(self.incoming.len());
        for slot in &mut buf[..n] {
            *slot = self.incoming.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for ChunkedStream {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn accept_request_targets_accept_path_with_empty_json_body() {
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    assert_eq!(request.method, "POST");
    assert_eq!(request.host, "192.168.1.20");
    assert_eq!(request.port, 8080);
    assert_eq!(request.path, "/accept");
    assert_eq!(request.content_type, "application/json");
    assert!(request.body.is_empty());
    assert_eq!(request.timeout_ms, 5_000);
}

#[test]
fn request_head_is_plain_http11_with_close() {
    let request = AcceptRequest::accept(&CONFIG, 5_000);
    let mut head = RequestHead::new();
    write_request(&request, &mut head).unwrap();

    assert_eq!(
        head.as_str(),
        "POST /accept HTTP/1.1\r\n\
         Host: 192.168.1.20:8080\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\r\n"
    );
}

#[test]
fn status_line_parsing() {
    assert_eq!(parse_status_line(b"HTTP/1.1 200 OK\r\n"), Some(200));
    assert_eq!(parse_status_line(b"HTTP/1.0 503 Service Unavailable"), Some(503));
    assert_eq!(parse_status_line(b"HTTP/1.1 404\r\nServer: x"), Some(404));
    assert_eq!(parse_status_line(b"SSH-2.0-OpenSSH\r\n"), None);
    assert_eq!(parse_status_line(b"HTTP/1.1 2000 Huh\r\n"), None);
    assert_eq!(parse_status_line(b""), None);
}

#[test]
fn content_length_header_is_case_insensitive() {
    let head = "HTTP/1.1 200 OK\r\ncontent-LENGTH:  12 \r\nServer: bench";
    assert_eq!(parse_content_length(head), Ok(Some(12)));
    assert_eq!(parse_content_length("HTTP/1.1 200 OK\r\nServer: x"), Ok(None));
    assert_eq!(
        parse_content_length("HTTP/1.1 200 OK\r\nContent-Length: lots"),
        Err(TransportError::MalformedResponse)
    );
}

#[test]
fn incomplete_head_is_not_an_error_yet() {
    assert_eq!(parse_head(b"HTTP/1.1 200 OK\r\nContent-Le"), Ok(None));
    assert_eq!(find_header_end(b"HTTP/1.1 200 OK\r\n\r\n"), Some(15));
}

#[test]
fn exchange_reads_body_across_chunks() {
    let response = b"HTTP/1.1 200 OK\r\nContent-Length: 16\r\n\r\n{\"accepted\":true}";
    let mut stream = ChunkedStream::new(response, 7);
    let mut buf = [0u8; 128];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    let reply = block_on(exchange(&mut stream, &request, &mut buf)).unwrap();

    assert_eq!(reply.status, 200);
    // Declared length clips the trailing byte.
    assert_eq!(reply.body, b"{\"accepted\":true");
    assert!(stream.written_text().starts_with("POST /accept HTTP/1.1\r\n"));
}

#[test]
fn exchange_stops_reading_once_declared_body_arrived() {
    let response = b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 2\r\n\r\nnoEXTRA-BYTES";
    let mut stream = ChunkedStream::new(response, response.len() - 11);
    let mut buf = [0u8; 128];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    let reply = block_on(exchange(&mut stream, &request, &mut buf)).unwrap();

    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, b"no");
    assert_eq!(stream.reads, 1);
}

#[test]
fn exchange_without_length_reads_until_close() {
    let response = b"HTTP/1.0 200 OK\r\nServer: bench\r\n\r\naccepted";
    let mut stream = ChunkedStream::new(response, 5);
    let mut buf = [0u8; 128];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    let reply = block_on(exchange(&mut stream, &request, &mut buf)).unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, b"accepted");
}

#[test]
fn exchange_truncates_long_body_to_buffer() {
    let mut response = Vec::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 400\r\n\r\n"[..]);
    response.extend(core::iter::repeat_n(b'x', 400));
    let mut stream = ChunkedStream::new(&response, 64);
    let mut buf = [0u8; 96];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    let reply = block_on(exchange(&mut stream, &request, &mut buf)).unwrap();

    assert_eq!(reply.status, 200);
    assert!(reply.body.iter().all(|&b| b == b'x'));
    assert_eq!(reply.body.len(), 96 - 40);
}

#[test]
fn oversized_head_still_reports_status() {
    let mut response = Vec::from(&b"HTTP/1.1 200 OK\r\n"[..]);
    for n in 0..12 {
        response.extend_from_slice(format!("X-Padding-{n}: {}\r\n", "a".repeat(40)).as_bytes());
    }
    response.extend_from_slice(b"Content-Length: 2\r\n\r\n{}");
    assert!(response.len() > RESPONSE_BUFFER_BYTES);
    let mut stream = ChunkedStream::new(&response, 64);
    let mut buf = [0u8; RESPONSE_BUFFER_BYTES];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    let reply = block_on(exchange(&mut stream, &request, &mut buf)).unwrap();

    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());
    assert_eq!(Outcome::from_status(reply.status), Outcome::Success);
}

#[test]
fn oversized_junk_is_still_malformed() {
    let junk = [b'z'; 80];
    let mut stream = ChunkedStream::new(&junk, 64);
    let mut buf = [0u8; 64];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    assert_eq!(
        block_on(exchange(&mut stream, &request, &mut buf)),
        Err(TransportError::MalformedResponse)
    );
}

#[test]
fn exchange_rejects_non_http_peer() {
    let mut stream = ChunkedStream::new(b"220 smtp.example ready\r\n\r\n", 64);
    let mut buf = [0u8; 64];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    assert_eq!(
        block_on(exchange(&mut stream, &request, &mut buf)),
        Err(TransportError::MalformedResponse)
    );
}

#[test]
fn exchange_maps_socket_failure_to_io() {
    let mut stream = ChunkedStream::new(b"", 64);
    stream.fail_reads = true;
    let mut buf = [0u8; 64];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    assert_eq!(
        block_on(exchange(&mut stream, &request, &mut buf)),
        Err(TransportError::Io)
    );
}

#[test]
fn closed_before_headers_is_malformed() {
    let mut stream = ChunkedStream::new(b"HTTP/1.1 200 OK\r\n", 64);
    let mut buf = [0u8; 64];
    let request = AcceptRequest::accept(&CONFIG, 5_000);

    assert_eq!(
        block_on(exchange(&mut stream, &request, &mut buf)),
        Err(TransportError::MalformedResponse)
    );
}

#[test]
fn only_200_is_success() {
    assert_eq!(Outcome::from_status(200), Outcome::Success);
    assert_eq!(Outcome::from_status(201), Outcome::HttpError(201));
    assert_eq!(Outcome::from_status(204), Outcome::HttpError(204));
    assert_eq!(Outcome::from_status(500), Outcome::HttpError(500));
    assert!(!Outcome::TransportError(TransportError::Dns).is_success());
}

#[test]
fn dispatcher_sends_exactly_one_request() {
    let clock = VirtualClock::default();
    let mut transport = FakeTransport::new(&clock);
    transport.reply(200, b"{\"status\":\"accepted\"}");
    let mut dispatcher = RequestDispatcher::new(5_000);

    let outcome = block_on(dispatcher.send_accept(&mut transport, &CONFIG));

    assert_eq!(outcome, Outcome::Success);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, "POST");
    assert_eq!(sent[0].path, "/accept");
    assert_eq!(sent[0].port, 8080);
    assert_eq!(sent[0].body_len, 0);
    assert_eq!(sent[0].timeout_ms, 5_000);
    assert_eq!(dispatcher.sent(), 1);
}

#[test]
fn dispatcher_reports_http_status_without_retrying() {
    let clock = VirtualClock::default();
    let mut transport = FakeTransport::new(&clock);
    transport.reply(503, b"busy");
    let mut dispatcher = RequestDispatcher::new(5_000);

    let outcome = block_on(dispatcher.send_accept(&mut transport, &CONFIG));

    assert_eq!(outcome, Outcome::HttpError(503));
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn dispatcher_timeout_is_bounded_by_request_timeout() {
    let clock = VirtualClock::default();
    let mut transport = FakeTransport::new(&clock);
    transport.fail(TransportError::Timeout);
    let mut dispatcher = RequestDispatcher::new(5_000);

    let outcome = block_on(dispatcher.send_accept(&mut transport, &CONFIG));

    assert_eq!(outcome, Outcome::TransportError(TransportError::Timeout));
    assert_eq!(clock.now(), 5_000);
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn lossy_body_replaces_invalid_utf8() {
    let text = LossyBody(b"ok \xff\xfe done").to_string();
    assert_eq!(text, "ok \u{FFFD}\u{FFFD} done");
    assert_eq!(LossyBody(b"").to_string(), "");
}
