//! Scripted collaborators for host tests.
//!
//! Every fake shares one virtual clock; delays advance it instead of sleeping.

use std::{cell::RefCell, collections::VecDeque, rc::Rc, string::String, vec::Vec};

use core::{cell::Cell, net::Ipv4Addr};

use embedded_hal_async::delay::DelayNs;

use crate::{
    config::NetworkConfig,
    error::TransportError,
    http::{AcceptRequest, HttpResponse, HttpTransport},
    input::{InputEvent, InputProvider},
    network::WifiLink,
    render::{StatusColor, StatusSurface, StatusView},
};

pub const CONFIG: NetworkConfig = NetworkConfig::new("bench-ap", "hunter22", "192.168.1.20", 8080);

#[derive(Clone, Debug, Default)]
pub struct VirtualClock(Rc<Cell<u64>>);

impl VirtualClock {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

#[derive(Clone, Debug)]
pub struct FakeDelay {
    clock: VirtualClock,
    pub waits: Rc<RefCell<Vec<u32>>>,
}

impl FakeDelay {
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            waits: Rc::default(),
        }
    }

    pub fn waits(&self) -> Vec<u32> {
        self.waits.borrow().clone()
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns) / 1_000_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.clock.advance(u64::from(us) / 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits.borrow_mut().push(ms);
        self.clock.advance(u64::from(ms));
    }
}

#[derive(Debug, Default)]
pub struct LinkScript {
    /// Association delay per `begin` call; `None` never associates.
    pub plan: VecDeque<Option<u64>>,
    /// Used once `plan` runs dry.
    pub fallback: Option<u64>,
    pub refuse_start: bool,
    pub begins: u32,
    pub up_at: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct FakeLink {
    clock: VirtualClock,
    pub script: Rc<RefCell<LinkScript>>,
}

impl FakeLink {
    /// Associates `after_ms` after every `begin`.
    pub fn associating_after(clock: &VirtualClock, after_ms: u64) -> Self {
        Self::with_script(
            clock,
            LinkScript {
                fallback: Some(after_ms),
                ..LinkScript::default()
            },
        )
    }

    pub fn never_associating(clock: &VirtualClock) -> Self {
        Self::with_script(clock, LinkScript::default())
    }

    pub fn with_script(clock: &VirtualClock, script: LinkScript) -> Self {
        Self {
            clock: clock.clone(),
            script: Rc::new(RefCell::new(script)),
        }
    }

    pub fn drop_link(&self) {
        self.script.borrow_mut().up_at = None;
    }

    pub fn begins(&self) -> u32 {
        self.script.borrow().begins
    }
}

impl WifiLink for FakeLink {
    type Error = &'static str;

    async fn begin(&mut self, _config: &NetworkConfig) -> Result<(), Self::Error> {
        let mut script = self.script.borrow_mut();
        script.begins += 1;
        if script.refuse_start {
            return Err("radio not started");
        }
        let delay = match script.plan.pop_front() {
            Some(step) => step,
            None => script.fallback,
        };
        script.up_at = delay.map(|after| self.clock.now() + after);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.script
            .borrow()
            .up_at
            .is_some_and(|at| self.clock.now() >= at)
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        self.is_connected().then_some(Ipv4Addr::new(192, 168, 1, 77))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SentRequest {
    pub method: &'static str,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub content_type: String,
    pub body_len: usize,
    pub timeout_ms: u64,
}

#[derive(Clone, Debug)]
pub struct FakeTransport {
    clock: VirtualClock,
    pub replies: Rc<RefCell<VecDeque<Result<(u16, &'static [u8]), TransportError>>>>,
    pub sent: Rc<RefCell<Vec<SentRequest>>>,
}

impl FakeTransport {
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            replies: Rc::default(),
            sent: Rc::default(),
        }
    }

    pub fn reply(&self, status: u16, body: &'static [u8]) {
        self.replies.borrow_mut().push_back(Ok((status, body)));
    }

    pub fn fail(&self, error: TransportError) {
        self.replies.borrow_mut().push_back(Err(error));
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.borrow().clone()
    }
}

impl HttpTransport for FakeTransport {
    async fn post<'b>(
        &mut self,
        request: &AcceptRequest<'_>,
        response_buf: &'b mut [u8],
    ) -> Result<HttpResponse<'b>, TransportError> {
        self.sent.borrow_mut().push(SentRequest {
            method: request.method,
            host: request.host.into(),
            port: request.port,
            path: request.path.into(),
            content_type: request.content_type.into(),
            body_len: request.body.len(),
            timeout_ms: request.timeout_ms,
        });

        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(TransportError::Connect));
        match reply {
            Ok((status, body)) => {
                let len = body.len().min(response_buf.len());
                response_buf[..len].copy_from_slice(&body[..len]);
                let response_buf: &'b [u8] = response_buf;
                Ok(HttpResponse {
                    status,
                    body: &response_buf[..len],
                })
            }
            Err(TransportError::Timeout) => {
                self.clock.advance(request.timeout_ms);
                Err(TransportError::Timeout)
            }
            Err(err) => Err(err),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SurfaceOp {
    Show {
        at_ms: u64,
        color: StatusColor,
        headline: String,
        detail: Option<String>,
    },
    Clear {
        at_ms: u64,
    },
}

impl SurfaceOp {
    pub fn headline(&self) -> Option<&str> {
        match self {
            Self::Show { headline, .. } => Some(headline),
            Self::Clear { .. } => None,
        }
    }

    pub fn at_ms(&self) -> u64 {
        match self {
            Self::Show { at_ms, .. } | Self::Clear { at_ms } => *at_ms,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordingSurface {
    clock: VirtualClock,
    pub ops: Rc<RefCell<Vec<SurfaceOp>>>,
    pub broken: Rc<Cell<bool>>,
}

impl RecordingSurface {
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            ops: Rc::default(),
            broken: Rc::default(),
        }
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.borrow().clone()
    }

    /// Headlines in draw order, `"<clear>"` marking clears.
    pub fn script(&self) -> Vec<String> {
        self.ops
            .borrow()
            .iter()
            .map(|op| op.headline().unwrap_or("<clear>").into())
            .collect()
    }

    pub fn reset(&self) {
        self.ops.borrow_mut().clear();
    }
}

impl StatusSurface for RecordingSurface {
    type Error = ();

    fn show(&mut self, view: &StatusView) -> Result<(), Self::Error> {
        self.ops.borrow_mut().push(SurfaceOp::Show {
            at_ms: self.clock.now(),
            color: view.color,
            headline: view.headline.into(),
            detail: view.detail.as_ref().map(|d| d.as_str().into()),
        });
        if self.broken.get() { Err(()) } else { Ok(()) }
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.ops.borrow_mut().push(SurfaceOp::Clear {
            at_ms: self.clock.now(),
        });
        if self.broken.get() { Err(()) } else { Ok(()) }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    pub events: Rc<RefCell<VecDeque<Result<InputEvent, &'static str>>>>,
}

impl ScriptedInput {
    pub fn press(&self) {
        self.events.borrow_mut().push_back(Ok(InputEvent::Press));
    }

    pub fn fault(&self) {
        self.events.borrow_mut().push_back(Err("gpio read failed"));
    }
}

impl InputProvider for ScriptedInput {
    type Error = &'static str;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        match self.events.borrow_mut().pop_front() {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}
