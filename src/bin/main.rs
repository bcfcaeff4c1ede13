#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use accept_core::{
    app::{AcceptApp, TickResult},
    config::{NetworkConfig, Timing, port_or_default},
};
use accept_hal_esp32s3::{
    input::button::{ButtonConfig, ButtonInput},
    platform::display::StatusDisplay,
};
use embassy_executor::Spawner;
use embassy_time::{Delay as AsyncDelay, Instant, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    spi::master::Spi,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use gc9107::FrameBuffer;
use log::{LevelFilter, info};
use static_cell::StaticCell;

use http::TcpTransport;
use wifi::EspWifiLink;

#[path = "main/http.rs"]
mod http;
#[path = "main/wifi.rs"]
mod wifi;

const LOOP_INTERVAL_MS: u64 = 10;

const WIFI_SSID: &str = env!(
    "ACCEPT_WIFI_SSID",
    "Set ACCEPT_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "ACCEPT_WIFI_PASSWORD",
    "Set ACCEPT_WIFI_PASSWORD in your environment before building/flashing."
);
const SERVER_HOST: &str = env!(
    "ACCEPT_SERVER_HOST",
    "Set ACCEPT_SERVER_HOST (IPv4 address or hostname of the accept server)."
);
const SERVER_PORT: u16 = port_or_default(option_env!("ACCEPT_SERVER_PORT"));
const NETWORK_CONFIG: NetworkConfig =
    NetworkConfig::new(WIFI_SSID, WIFI_PASSWORD, SERVER_HOST, SERVER_PORT);

static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();
static FRAME: StaticCell<FrameBuffer> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: accept-button starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // AtomS3 LCD wiring: SCK=GPIO17, MOSI=GPIO21, CS=GPIO15, DC=GPIO33,
    // RST=GPIO34, backlight=GPIO16
    let _backlight = Output::new(peripherals.GPIO16, Level::High, OutputConfig::default());
    let cs = Output::new(peripherals.GPIO15, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO33, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO34, Level::High, OutputConfig::default());

    let lcd_config = gc9107::Config::default();
    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(lcd_config.spi_hz))
        .with_mode(esp_hal::spi::Mode::_0);

    let spi = match Spi::new(peripherals.SPI2, spi_config) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO17)
            .with_mosi(peripherals.GPIO21),
        Err(err) => {
            info!("display spi config rejected: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let mut delay = Delay::new();
    let spi_device = match ExclusiveDevice::new(spi, cs, delay) {
        Ok(device) => device,
        Err(err) => {
            info!("display chip-select init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let mut display = StatusDisplay::new(spi_device, dc, rst, FRAME.init(FrameBuffer::new()));
    info!("display: init begin (SCK=17 MOSI=21 CS=15 DC=33 RST=34)");
    match display.initialize(&mut delay) {
        Ok(()) => info!("display: initialize ok"),
        Err(err) => info!("display: initialize failed: {:?}", err),
    }

    // Front button: GPIO41, pulled up, pressed pulls low.
    let button_pin = Input::new(
        peripherals.GPIO41,
        InputConfig::default().with_pull(Pull::Up),
    );
    let button = match ButtonInput::new(button_pin, ButtonConfig::default()) {
        Ok(button) => button,
        Err(err) => {
            info!("button init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(NETWORK_CONFIG.ssid.into())
        .with_password(NETWORK_CONFIG.password.into());
    let wifi_mode = ModeConfig::Client(client_config);
    if let Err(err) = wifi_controller.set_config(&wifi_mode) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x7C3A_91E5_0B44_D2F1,
    );

    let mut app = AcceptApp::new(
        EspWifiLink::new(wifi_controller, stack),
        TcpTransport::new(stack),
        display,
        button,
        AsyncDelay,
        NETWORK_CONFIG,
        Timing::default(),
    );

    info!(
        "Accept button configured: ssid={} server={}:{}",
        NETWORK_CONFIG.ssid, NETWORK_CONFIG.host, NETWORK_CONFIG.port
    );
    info!("Button pin: GPIO41 (active low)");

    let net_future = net_runner.run();
    let app_future = async {
        if let Err(err) = app.start().await {
            info!("initial wifi connect failed: {:?}", err);
        }

        loop {
            let now_ms = Instant::now().as_millis();
            match app.tick(now_ms).await {
                TickResult::Idle | TickResult::PressDebounced => {}
                result => info!("tick: {:?} state={}", result, app.state().as_str()),
            }

            Timer::after_millis(LOOP_INTERVAL_MS).await;
        }
    };

    let _ = embassy_futures::join::join(net_future, app_future).await;
    unreachable!()
}
