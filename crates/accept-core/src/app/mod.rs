//! Device state machine: link supervision, press handling, dispatch and
//! the matching display sequence.

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::{
    config::{NetworkConfig, Timing},
    error::LinkError,
    http::{HttpTransport, Outcome, RequestDispatcher},
    input::{InputDebouncer, InputEvent, InputProvider},
    network::{ConnectivitySupervisor, LinkHealth, WifiLink},
    render::{DisplayController, StatusSurface},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCause {
    Link,
    Transport,
    Http(u16),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceState {
    Booting,
    Connecting,
    Ready,
    Sending,
    Success,
    Error(ErrorCause),
    LinkLost,
}

impl DeviceState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Sending => "sending",
            Self::Success => "success",
            Self::Error(ErrorCause::Link) => "error(link)",
            Self::Error(ErrorCause::Transport) => "error(transport)",
            Self::Error(ErrorCause::Http(_)) => "error(http)",
            Self::LinkLost => "link-lost",
        }
    }

    const fn after(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => Self::Success,
            Outcome::HttpError(code) => Self::Error(ErrorCause::Http(code)),
            Outcome::TransportError(_) => Self::Error(ErrorCause::Transport),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    Idle,
    /// Link was down and `connect` brought it back.
    Reconnected,
    ReconnectFailed(LinkError),
    /// Presses arrived but all fell inside the debounce window.
    PressDebounced,
    Dispatched(Outcome),
}

pub struct AcceptApp<L, T, S, IN, D>
where
    L: WifiLink,
    T: HttpTransport,
    S: StatusSurface,
    IN: InputProvider,
    D: DelayNs,
{
    link: L,
    transport: T,
    display: DisplayController<S>,
    input: IN,
    delay: D,
    config: NetworkConfig,
    timing: Timing,
    supervisor: ConnectivitySupervisor,
    debouncer: InputDebouncer,
    dispatcher: RequestDispatcher,
    state: DeviceState,
}

impl<L, T, S, IN, D> AcceptApp<L, T, S, IN, D>
where
    L: WifiLink,
    T: HttpTransport,
    S: StatusSurface,
    IN: InputProvider,
    D: DelayNs,
{
    pub fn new(
        link: L,
        transport: T,
        surface: S,
        input: IN,
        delay: D,
        config: NetworkConfig,
        timing: Timing,
    ) -> Self {
        Self {
            link,
            transport,
            display: DisplayController::new(surface, config.host, &timing),
            input,
            delay,
            config,
            timing,
            supervisor: ConnectivitySupervisor::new(&timing),
            debouncer: InputDebouncer::new(timing.debounce_ms),
            dispatcher: RequestDispatcher::new(timing.request_timeout_ms),
            state: DeviceState::Booting,
        }
    }

    /// Shows the boot screen and makes the first connection attempt.
    ///
    /// A failure is shown and paused on, then left for `tick` to retry.
    pub async fn start(&mut self) -> Result<(), LinkError> {
        info!(
            "app: start host={}:{} ssid={}",
            self.config.host, self.config.port, self.config.ssid
        );
        self.display.render(DeviceState::Booting, &mut self.delay).await;
        self.establish_link().await
    }

    /// One poll cycle.
    pub async fn tick(&mut self, now_ms: u64) -> TickResult {
        match self.supervisor.poll_link_health(&self.link) {
            LinkHealth::Up => {
                if self.state == DeviceState::Error(ErrorCause::Link) {
                    info!("wifi: link came up after failed attempt");
                    self.enter(DeviceState::Ready).await;
                }
            }
            LinkHealth::Lost => {
                warn!("wifi: link lost");
                self.enter(DeviceState::LinkLost).await;
                return self.reconnect().await;
            }
            LinkHealth::Down => return self.reconnect().await,
        }

        match self.poll_press(now_ms) {
            PressPoll::None => TickResult::Idle,
            PressPoll::Debounced => TickResult::PressDebounced,
            PressPoll::Accepted => TickResult::Dispatched(self.dispatch().await),
        }
    }

    async fn establish_link(&mut self) -> Result<(), LinkError> {
        self.enter(DeviceState::Connecting).await;
        let result = self
            .supervisor
            .connect(&mut self.link, &self.config, &mut self.delay)
            .await;

        match result {
            Ok(()) => self.enter(DeviceState::Ready).await,
            Err(err) => {
                warn!("wifi: connect failed: {}", err);
                self.enter(DeviceState::Error(ErrorCause::Link)).await;
                self.delay.delay_ms(self.timing.link_fail_pause_ms).await;
            }
        }
        result
    }

    async fn reconnect(&mut self) -> TickResult {
        match self.establish_link().await {
            Ok(()) => TickResult::Reconnected,
            Err(err) => TickResult::ReconnectFailed(err),
        }
    }

    /// Drains pending input and runs every press through the debouncer.
    fn poll_press(&mut self, now_ms: u64) -> PressPoll {
        let mut poll = PressPoll::None;
        loop {
            match self.input.poll_event() {
                Ok(Some(InputEvent::Press)) => {
                    info!("input: button pressed at={}", now_ms);
                    if self.debouncer.on_edge(now_ms) {
                        poll = PressPoll::Accepted;
                    } else if poll == PressPoll::None {
                        poll = PressPoll::Debounced;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("input: poll failed: {:?}", err);
                    break;
                }
            }
        }
        poll
    }

    async fn dispatch(&mut self) -> Outcome {
        self.enter(DeviceState::Sending).await;
        let outcome = self
            .dispatcher
            .send_accept(&mut self.transport, &self.config)
            .await;

        self.enter(DeviceState::after(outcome)).await;
        self.delay.delay_ms(self.timing.settle_ms).await;
        self.enter(DeviceState::Ready).await;
        outcome
    }

    async fn enter(&mut self, next: DeviceState) {
        info!("app: {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
        self.display.render(next, &mut self.delay).await;
    }

    pub const fn state(&self) -> DeviceState {
        self.state
    }

    pub const fn supervisor(&self) -> &ConnectivitySupervisor {
        &self.supervisor
    }

    pub const fn debouncer(&self) -> &InputDebouncer {
        &self.debouncer
    }

    pub const fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PressPoll {
    None,
    Debounced,
    Accepted,
}
