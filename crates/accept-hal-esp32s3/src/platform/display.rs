use accept_core::render::{StatusSurface, StatusView};
use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};
use gc9107::{Config, FrameBuffer, Gc9107, protocol};
use log::info;

use crate::render::{FrameRenderer, status::StatusRenderer};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DisplayError<SpiErr, DcErr, RstErr> {
    Spi(SpiErr),
    Dc(DcErr),
    Rst(RstErr),
    Protocol,
}

impl<SpiErr, DcErr, RstErr> From<gc9107::Error<SpiErr, DcErr, RstErr>>
    for DisplayError<SpiErr, DcErr, RstErr>
{
    fn from(err: gc9107::Error<SpiErr, DcErr, RstErr>) -> Self {
        match err {
            gc9107::Error::Spi(err) => Self::Spi(err),
            gc9107::Error::Dc(err) => Self::Dc(err),
            gc9107::Error::Rst(err) => Self::Rst(err),
            gc9107::Error::InvalidInput => Self::Protocol,
        }
    }
}

pub type StatusDisplayResult<SpiErr, DcErr, RstErr> =
    Result<(), DisplayError<SpiErr, DcErr, RstErr>>;

/// AtomS3 status panel: renders each view into a framebuffer and pushes
/// the whole frame.
pub struct StatusDisplay<'a, SPI, DC, RST, R = StatusRenderer> {
    lcd: Gc9107<SPI, DC, RST>,
    frame: &'a mut FrameBuffer,
    renderer: R,
    flushes: u32,
}

impl<'a, SPI, DC, RST> StatusDisplay<'a, SPI, DC, RST>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, frame: &'a mut FrameBuffer) -> Self {
        Self::with_renderer(spi, dc, rst, frame, StatusRenderer::new())
    }
}

impl<'a, SPI, DC, RST, R> StatusDisplay<'a, SPI, DC, RST, R>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
    R: FrameRenderer,
{
    pub fn with_renderer(
        spi: SPI,
        dc: DC,
        rst: RST,
        frame: &'a mut FrameBuffer,
        renderer: R,
    ) -> Self {
        Self {
            lcd: Gc9107::new(spi, dc, rst, Config::default()),
            frame,
            renderer,
            flushes: 0,
        }
    }

    /// Resets the controller, runs the power-up sequence and blanks the panel.
    pub fn initialize<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> StatusDisplayResult<SPI::Error, DC::Error, RST::Error> {
        self.lcd.init(delay)?;
        info!(
            "display: gc9107 ready {}x{} row_offset={}",
            protocol::WIDTH,
            protocol::HEIGHT,
            self.lcd.config().row_offset
        );
        self.blank()
    }

    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    fn blank(&mut self) -> StatusDisplayResult<SPI::Error, DC::Error, RST::Error> {
        self.frame.fill(0);
        self.flush()
    }

    fn flush(&mut self) -> StatusDisplayResult<SPI::Error, DC::Error, RST::Error> {
        self.lcd.flush_full(self.frame)?;
        self.flushes = self.flushes.wrapping_add(1);
        Ok(())
    }
}

impl<SPI, DC, RST, R> StatusSurface for StatusDisplay<'_, SPI, DC, RST, R>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    RST: OutputPin,
    R: FrameRenderer,
{
    type Error = DisplayError<SPI::Error, DC::Error, RST::Error>;

    fn show(&mut self, view: &StatusView) -> Result<(), Self::Error> {
        self.renderer.render(view, self.frame);
        self.flush()
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.blank()
    }
}
