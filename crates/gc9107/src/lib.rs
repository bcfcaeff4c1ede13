#![cfg_attr(not(test), no_std)]

//! GC9107 (128x128 RGB565 TFT, as fitted to the M5Stack AtomS3) driver primitives.

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::FrameBuffer;

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Expected SPI clock in Hz (documented for board glue).
    pub spi_hz: u32,
    /// Column offset of the visible area inside controller RAM.
    pub col_offset: u16,
    /// Row offset of the visible area inside controller RAM.
    pub row_offset: u16,
    /// Raw `MADCTL` value (orientation and subpixel order).
    pub madctl: u8,
    pub invert: bool,
}

impl Default for Config {
    /// AtomS3 wiring: 128 visible rows starting at RAM row 32.
    fn default() -> Self {
        Self {
            spi_hz: 40_000_000,
            col_offset: 0,
            row_offset: 32,
            madctl: protocol::MADCTL_BGR,
            invert: false,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr, RstErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// DC pin operation failed.
    Dc(DcErr),
    /// RST pin operation failed.
    Rst(RstErr),
    /// Input parameters are outside supported bounds.
    InvalidInput,
}

pub type DriverResult<SpiErr, DcErr, RstErr> = Result<(), Error<SpiErr, DcErr, RstErr>>;

/// GC9107 driver.
#[derive(Debug)]
pub struct Gc9107<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
    config: Config,
}

impl<SPI, DC, RST> Gc9107<SPI, DC, RST>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, config: Config) -> Self {
        Self {
            spi,
            dc,
            rst,
            config,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Pulses RST low and waits for the controller to come back.
    pub fn hard_reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.rst.set_high().map_err(Error::Rst)?;
        delay.delay_ms(10);
        self.rst.set_low().map_err(Error::Rst)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(Error::Rst)?;
        delay.delay_ms(120);
        Ok(())
    }

    /// Hard reset followed by the power-up sequence and the configured
    /// orientation. Leaves the panel on.
    pub fn init<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.hard_reset(delay)?;
        self.command(protocol::SWRESET, &[])?;
        delay.delay_ms(120);

        for step in protocol::INIT_SEQUENCE {
            self.command(step.command, step.params)?;
            if step.delay_ms > 0 {
                delay.delay_ms(step.delay_ms);
            }
        }

        self.command(protocol::MADCTL, &[self.config.madctl])?;
        let inversion = if self.config.invert {
            protocol::INVON
        } else {
            protocol::INVOFF
        };
        self.command(inversion, &[])
    }

    /// Sends one command byte (DC low) followed by its parameters (DC high).
    pub fn command(
        &mut self,
        command: u8,
        params: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Dc)?;
        if params.is_empty() {
            return Ok(());
        }
        self.spi.write(params).map_err(Error::Spi)
    }

    /// Selects the inclusive pixel window for the next `RAMWR`.
    pub fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        let columns = protocol::encode_address_window(
            x0,
            x1,
            self.config.col_offset,
            protocol::WIDTH as u16,
        )
        .ok_or(Error::InvalidInput)?;
        let rows =
            protocol::encode_address_window(y0, y1, self.config.row_offset, protocol::HEIGHT as u16)
                .ok_or(Error::InvalidInput)?;

        self.command(protocol::CASET, &columns)?;
        self.command(protocol::RASET, &rows)
    }

    /// Writes a full framebuffer, one row per SPI write.
    pub fn flush_full(
        &mut self,
        buffer: &FrameBuffer,
    ) -> DriverResult<SPI::Error, DC::Error, RST::Error> {
        self.set_window(0, 0, protocol::WIDTH as u16 - 1, protocol::HEIGHT as u16 - 1)?;
        self.command(protocol::RAMWR, &[])?;

        let mut row = [0u8; protocol::ROW_BYTES];
        for y in 0..protocol::HEIGHT {
            if !buffer.encode_row(y, &mut row) {
                return Err(Error::InvalidInput);
            }
            self.spi.write(&row).map_err(Error::Spi)?;
        }

        Ok(())
    }
}
