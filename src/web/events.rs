//! Page-level `message` events and reply ports.

use std::rc::Rc;

use bridge::BridgeMessage;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{MessageEvent, MessagePort, Window};

use super::{from_js, js_error, to_js};
use crate::host::{
    HostError, IncomingMessage, MessageEvents, MessageHandler, ReplyPort, Subscription,
};

pub struct WindowMessages {
    window: Window,
}

impl WindowMessages {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl MessageEvents for WindowMessages {
    fn subscribe(&self, handler: MessageHandler) -> Result<Subscription, HostError> {
        let listener = Closure::wrap(Box::new(move |event: MessageEvent| {
            // Data that does not survive JSON cannot be ours.
            let Ok(data) = from_js(&event.data()) else {
                return;
            };
            let ports = event
                .ports()
                .iter()
                .filter_map(|p| p.dyn_into::<MessagePort>().ok())
                .map(|p| Rc::new(BrowserPort(p)) as Rc<dyn ReplyPort>)
                .collect();
            wasm_bindgen_futures::spawn_local(handler(IncomingMessage { data, ports }));
        }) as Box<dyn FnMut(MessageEvent)>);

        self.window
            .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
            .map_err(js_error)?;

        let window = self.window.clone();
        Ok(Subscription::new(move || {
            if let Err(e) = window
                .remove_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
            {
                log::warn!("customer profiles: failed to detach message listener: {}", js_error(e));
            }
        }))
    }
}

struct BrowserPort(MessagePort);

impl ReplyPort for BrowserPort {
    fn post(&self, message: &BridgeMessage) -> Result<(), HostError> {
        let payload = to_js(&message.to_value())?;
        self.0.post_message(&payload).map_err(js_error)
    }
}
