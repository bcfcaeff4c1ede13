use core::net::Ipv4Addr;

use accept_core::{
    error::TransportError,
    http::{self, AcceptRequest, HttpResponse, HttpTransport},
};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, with_timeout};
use log::{debug, info};

const SOCKET_BUFFER_BYTES: usize = 1024;

/// Plain-HTTP client over an embassy-net TCP socket. One connection per
/// request, closed after the response.
pub struct TcpTransport<'d> {
    stack: Stack<'d>,
    rx_buffer: [u8; SOCKET_BUFFER_BYTES],
    tx_buffer: [u8; SOCKET_BUFFER_BYTES],
}

impl<'d> TcpTransport<'d> {
    pub fn new(stack: Stack<'d>) -> Self {
        Self {
            stack,
            rx_buffer: [0; SOCKET_BUFFER_BYTES],
            tx_buffer: [0; SOCKET_BUFFER_BYTES],
        }
    }

    async fn resolve(&self, host: &str) -> Result<IpAddress, TransportError> {
        if let Ok(addr) = host.parse::<Ipv4Addr>() {
            return Ok(IpAddress::Ipv4(addr));
        }

        let addrs = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|err| {
                info!("http: dns lookup for {} failed: {:?}", host, err);
                TransportError::Dns
            })?;
        addrs.first().copied().ok_or(TransportError::Dns)
    }
}

impl HttpTransport for TcpTransport<'_> {
    async fn post<'b>(
        &mut self,
        request: &AcceptRequest<'_>,
        response_buf: &'b mut [u8],
    ) -> Result<HttpResponse<'b>, TransportError> {
        let budget = Duration::from_millis(request.timeout_ms);

        let attempt = async move {
            let addr = self.resolve(request.host).await?;
            debug!("http: connecting to {}:{}", addr, request.port);

            let stack = self.stack;
            let mut socket = TcpSocket::new(stack, &mut self.rx_buffer, &mut self.tx_buffer);
            socket.set_timeout(Some(budget));
            socket
                .connect((addr, request.port))
                .await
                .map_err(|err| {
                    info!("http: connect failed: {:?}", err);
                    TransportError::Connect
                })?;

            let result = http::exchange(&mut socket, request, response_buf).await;
            socket.close();
            result
        };

        with_timeout(budget, attempt)
            .await
            .unwrap_or(Err(TransportError::Timeout))
    }
}
