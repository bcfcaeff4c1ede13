use core::net::Ipv4Addr;

use accept_core::{config::NetworkConfig, network::WifiLink};
use embassy_net::Stack;
use esp_radio::wifi::{WifiController, WifiError};
use log::info;

/// Station link over the esp-radio controller and the embassy-net stack.
///
/// Connected means associated with the AP and holding a DHCP lease.
pub struct EspWifiLink<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
}

impl<'d> EspWifiLink<'d> {
    pub fn new(controller: WifiController<'d>, stack: Stack<'d>) -> Self {
        Self { controller, stack }
    }
}

impl WifiLink for EspWifiLink<'_> {
    type Error = WifiError;

    async fn begin(&mut self, _config: &NetworkConfig) -> Result<(), WifiError> {
        if !self.controller.is_started().unwrap_or(false) {
            self.controller.start_async().await?;
            info!("wifi: controller started");
        }

        // A stale association would make connect() fail straight away.
        let _ = self.controller.disconnect();
        self.controller.connect()
    }

    fn is_connected(&self) -> bool {
        matches!(self.controller.is_connected(), Ok(true)) && self.stack.config_v4().is_some()
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        self.stack.config_v4().map(|config| config.address.address())
    }
}
