//! Wi-Fi link supervision.

use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use crate::{
    config::{NetworkConfig, Timing},
    error::LinkError,
};

/// Station-mode link provided by the board.
#[allow(async_fn_in_trait)]
pub trait WifiLink {
    type Error: core::fmt::Debug;

    /// Kicks off association with the configured access point.
    ///
    /// Must not wait for the link to come up; status is observed through
    /// [`WifiLink::is_connected`].
    async fn begin(&mut self, config: &NetworkConfig) -> Result<(), Self::Error>;

    /// Non-blocking status: associated and holding an IPv4 address.
    fn is_connected(&self) -> bool;

    fn local_address(&self) -> Option<Ipv4Addr> {
        None
    }
}

/// Result of one per-tick health check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkHealth {
    Up,
    /// Was connected on the previous check and is not anymore.
    Lost,
    /// Still not connected since the last failed `connect`.
    Down,
}

/// Owns the connection flag and the bounded association loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectivitySupervisor {
    poll_interval_ms: u32,
    poll_attempts: u8,
    connected: bool,
    connect_calls: u32,
}

impl ConnectivitySupervisor {
    pub const fn new(timing: &Timing) -> Self {
        Self {
            poll_interval_ms: timing.link_poll_interval_ms,
            poll_attempts: timing.link_poll_attempts,
            connected: false,
            connect_calls: 0,
        }
    }

    /// Starts association and polls the status until connected or until
    /// the attempt ceiling is reached.
    pub async fn connect<L, D>(
        &mut self,
        link: &mut L,
        config: &NetworkConfig,
        delay: &mut D,
    ) -> Result<(), LinkError>
    where
        L: WifiLink,
        D: DelayNs,
    {
        self.connect_calls = self.connect_calls.saturating_add(1);
        self.connected = false;
        info!(
            "wifi: connecting ssid={} call={}",
            config.ssid, self.connect_calls
        );

        if let Err(err) = link.begin(config).await {
            warn!("wifi: association start failed: {:?}", err);
            return Err(LinkError::StartFailed);
        }

        let mut attempts = 0u8;
        while !link.is_connected() && attempts < self.poll_attempts {
            delay.delay_ms(self.poll_interval_ms).await;
            attempts += 1;
            debug!("wifi: waiting attempt={}/{}", attempts, self.poll_attempts);
        }

        if !link.is_connected() {
            warn!("wifi: failed after {} polls", attempts);
            return Err(LinkError::Timeout { attempts });
        }

        self.connected = true;
        match link.local_address() {
            Some(ip) => info!("wifi: connected ip={}", ip),
            None => info!("wifi: connected"),
        }
        Ok(())
    }

    pub fn is_connected<L: WifiLink>(&self, link: &L) -> bool {
        link.is_connected()
    }

    /// Once-per-tick check. Reports [`LinkHealth::Lost`] exactly once per
    /// drop; repeated calls while connected change nothing.
    pub fn poll_link_health<L: WifiLink>(&mut self, link: &L) -> LinkHealth {
        if link.is_connected() {
            self.connected = true;
            return LinkHealth::Up;
        }

        if self.connected {
            self.connected = false;
            LinkHealth::Lost
        } else {
            LinkHealth::Down
        }
    }

    /// Connection flag as of the last `connect` or health check.
    pub const fn was_connected(&self) -> bool {
        self.connected
    }

    pub const fn connect_calls(&self) -> u32 {
        self.connect_calls
    }
}
