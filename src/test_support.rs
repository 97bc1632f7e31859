//! In-memory host fakes shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use bridge::BridgeMessage;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::config::LocalCredentials;
use crate::consts::WIDGET_FRAME_ID;
use crate::host::{
    AppInit, Fetch, FetchFailure, Host, HostError, HttpRequest, IncomingMessage, MessageEvents,
    MessageHandler, PageContext, Reply, ReplyPort, Subscription, WidgetFrame, WidgetHost,
};

pub const INSTANCE_URL: &str = "https://www.instanceurl.aws.com/";
pub const INSTANCE_API_ENDPOINT_URL: &str = "https://www.instanceurl.aws.com/agent-app/api";
pub const WIDGET_SRC: &str = "https://www.instanceurl.aws.com/customerprofiles-v2";
pub const CONNECT_PAGE: &str = "https://instanceurl.aws.com/connect/ccp-v2";
pub const THIRD_PARTY_PAGE: &str = "https://agent-app.example.org/index.html";

// =============================================================================
// PAGE
// =============================================================================

pub struct FakePage {
    href: Option<String>,
    pub credentials: RefCell<Option<LocalCredentials>>,
}

impl FakePage {
    pub fn at(href: Option<&str>) -> Rc<Self> {
        Rc::new(Self {
            href: href.map(str::to_owned),
            credentials: RefCell::new(None),
        })
    }
}

impl PageContext for FakePage {
    fn location_href(&self) -> Option<String> {
        self.href.clone()
    }

    fn local_credentials(&self) -> Option<LocalCredentials> {
        self.credentials.borrow().clone()
    }
}

// =============================================================================
// FETCH
// =============================================================================

pub struct FakeFetch {
    pub requests: RefCell<Vec<HttpRequest>>,
    outcome: RefCell<Result<Value, FetchFailure>>,
}

impl FakeFetch {
    pub fn ok(data: Value) -> Rc<Self> {
        Rc::new(Self {
            requests: RefCell::new(Vec::new()),
            outcome: RefCell::new(Ok(data)),
        })
    }

    pub fn failing(status: u16, status_text: &str) -> Rc<Self> {
        Rc::new(Self {
            requests: RefCell::new(Vec::new()),
            outcome: RefCell::new(Err(FetchFailure {
                status,
                status_text: status_text.to_owned(),
            })),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait::async_trait(?Send)]
impl Fetch for FakeFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<Value, FetchFailure> {
        self.requests.borrow_mut().push(request);
        self.outcome.borrow().clone()
    }
}

// =============================================================================
// PAGE MESSAGES
// =============================================================================

#[derive(Default)]
pub struct FakeEvents {
    handler: Rc<RefCell<Option<MessageHandler>>>,
    pub subscribe_count: Cell<usize>,
}

impl FakeEvents {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn is_subscribed(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// Deliver a message to the listener, returning the future it started.
    pub fn dispatch(&self, message: IncomingMessage) -> Option<LocalBoxFuture<'static, ()>> {
        let handler = self.handler.borrow().clone()?;
        Some(handler(message))
    }
}

impl MessageEvents for FakeEvents {
    fn subscribe(&self, handler: MessageHandler) -> Result<Subscription, HostError> {
        self.subscribe_count.set(self.subscribe_count.get() + 1);
        *self.handler.borrow_mut() = Some(handler);
        let slot = Rc::clone(&self.handler);
        Ok(Subscription::new(move || {
            slot.borrow_mut().take();
        }))
    }
}

#[derive(Default)]
pub struct FakePort {
    pub posted: RefCell<Vec<BridgeMessage>>,
}

impl FakePort {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }
}

impl ReplyPort for FakePort {
    fn post(&self, message: &BridgeMessage) -> Result<(), HostError> {
        self.posted.borrow_mut().push(message.clone());
        Ok(())
    }
}

pub fn incoming(data: Value, port: Option<&Rc<FakePort>>) -> IncomingMessage {
    IncomingMessage {
        data,
        ports: port
            .map(|p| vec![Rc::clone(p) as Rc<dyn ReplyPort>])
            .unwrap_or_default(),
    }
}

// =============================================================================
// WIDGET
// =============================================================================

/// What the fake frame does with the reply port of an exchange.
pub enum FrameReply {
    Send(Value),
    Close,
}

pub struct FakeFrame {
    src: String,
    load_callbacks: RefCell<Vec<Box<dyn Fn()>>>,
    pub exchanges: RefCell<Vec<(BridgeMessage, String)>>,
    replies: RefCell<VecDeque<FrameReply>>,
    pending: RefCell<Vec<oneshot::Sender<Value>>>,
    pub fail_exchange: Cell<bool>,
}

impl FakeFrame {
    pub fn new(src: &str) -> Rc<Self> {
        Rc::new(Self {
            src: src.to_owned(),
            load_callbacks: RefCell::new(Vec::new()),
            exchanges: RefCell::new(Vec::new()),
            replies: RefCell::new(VecDeque::new()),
            pending: RefCell::new(Vec::new()),
            fail_exchange: Cell::new(false),
        })
    }

    pub fn fire_load(&self) {
        for callback in self.load_callbacks.borrow().iter() {
            callback();
        }
    }

    pub fn load_listener_count(&self) -> usize {
        self.load_callbacks.borrow().len()
    }

    /// Queue the reply for the next exchange.
    pub fn queue_reply(&self, reply: FrameReply) {
        self.replies.borrow_mut().push_back(reply);
    }
}

impl WidgetFrame for FakeFrame {
    fn src(&self) -> String {
        self.src.clone()
    }

    fn on_load(&self, callback: Box<dyn Fn()>) -> Result<(), HostError> {
        self.load_callbacks.borrow_mut().push(callback);
        Ok(())
    }

    fn exchange(&self, message: &BridgeMessage, target_origin: &str) -> Result<Reply, HostError> {
        if self.fail_exchange.get() {
            return Err(HostError::Js("DataCloneError".to_owned()));
        }
        self.exchanges
            .borrow_mut()
            .push((message.clone(), target_origin.to_owned()));

        let (tx, rx) = oneshot::channel();
        match self.replies.borrow_mut().pop_front() {
            Some(FrameReply::Send(value)) => {
                let _ = tx.send(value);
            }
            Some(FrameReply::Close) => drop(tx),
            None => self.pending.borrow_mut().push(tx),
        }
        Ok(rx)
    }
}

pub struct FakeWidgets {
    frame: RefCell<Option<Rc<FakeFrame>>>,
    mount_on_init: RefCell<Option<Rc<FakeFrame>>>,
    pub containers: RefCell<Vec<String>>,
    pub created_containers: RefCell<Vec<String>>,
    pub inits: RefCell<Vec<AppInit>>,
    pub app_host_installed: Cell<bool>,
}

impl FakeWidgets {
    /// A document without the widget; `initApp` mounts `frame`.
    pub fn empty(frame: Option<Rc<FakeFrame>>) -> Rc<Self> {
        Rc::new(Self {
            frame: RefCell::new(None),
            mount_on_init: RefCell::new(frame),
            containers: RefCell::new(Vec::new()),
            created_containers: RefCell::new(Vec::new()),
            inits: RefCell::new(Vec::new()),
            app_host_installed: Cell::new(true),
        })
    }

    /// A document that already contains the widget iframe.
    pub fn with_existing(frame: Rc<FakeFrame>) -> Rc<Self> {
        let widgets = Self::empty(None);
        *widgets.frame.borrow_mut() = Some(frame);
        widgets
    }

    pub fn mounted_frame(&self) -> Option<Rc<FakeFrame>> {
        self.frame.borrow().clone()
    }
}

impl WidgetHost for FakeWidgets {
    fn find_frame(&self, frame_id: &str) -> Option<Rc<dyn WidgetFrame>> {
        if frame_id != WIDGET_FRAME_ID {
            return None;
        }
        self.frame
            .borrow()
            .as_ref()
            .map(|f| Rc::clone(f) as Rc<dyn WidgetFrame>)
    }

    fn has_container(&self, container_id: &str) -> bool {
        self.containers.borrow().iter().any(|c| c == container_id)
    }

    fn create_container(&self, container_id: &str) -> Result<(), HostError> {
        self.containers.borrow_mut().push(container_id.to_owned());
        self.created_containers
            .borrow_mut()
            .push(container_id.to_owned());
        Ok(())
    }

    fn init_app(&self, init: &AppInit) -> Result<(), HostError> {
        self.inits.borrow_mut().push(init.clone());
        if !self.app_host_installed.get() {
            return Err(HostError::Unavailable("connect.agentApp.initApp"));
        }
        let mounted = self.mount_on_init.borrow_mut().take();
        if mounted.is_some() {
            *self.frame.borrow_mut() = mounted;
        }
        Ok(())
    }
}

// =============================================================================
// BUNDLE
// =============================================================================

pub struct Fakes {
    pub page: Rc<FakePage>,
    pub fetch: Rc<FakeFetch>,
    pub events: Rc<FakeEvents>,
    pub widgets: Rc<FakeWidgets>,
}

impl Fakes {
    /// Page at `href`, a fetch answering `"TestResponse"`, and a document
    /// whose app host mounts a widget frame on demand.
    pub fn at(href: Option<&str>) -> Self {
        Self {
            page: FakePage::at(href),
            fetch: FakeFetch::ok(Value::String("TestResponse".to_owned())),
            events: FakeEvents::new(),
            widgets: FakeWidgets::empty(Some(FakeFrame::new(WIDGET_SRC))),
        }
    }

    pub fn host(&self) -> Host {
        Host {
            page: Rc::clone(&self.page) as Rc<dyn PageContext>,
            fetch: Rc::clone(&self.fetch) as Rc<dyn Fetch>,
            messages: Rc::clone(&self.events) as Rc<dyn MessageEvents>,
            widgets: Rc::clone(&self.widgets) as Rc<dyn WidgetHost>,
        }
    }
}
