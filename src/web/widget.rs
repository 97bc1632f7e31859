//! The widget iframe, its container, and the Streams app host.

use std::cell::RefCell;
use std::rc::Rc;

use bridge::BridgeMessage;
use futures::channel::oneshot;
use js_sys::{Array, Function, Object, Reflect};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, HtmlIFrameElement, MessageChannel, MessageEvent, Window};

use super::{from_js, js_error, to_js};
use crate::consts::CONNECT_GLOBAL;
use crate::host::{AppInit, HostError, Reply, WidgetFrame, WidgetHost};

pub struct DocumentWidgets {
    window: Window,
    document: Document,
}

impl DocumentWidgets {
    #[must_use]
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// `connect.agentApp` and its `initApp` function.
    fn app_host(&self) -> Option<(JsValue, Function)> {
        let connect = Reflect::get(self.window.as_ref(), &JsValue::from_str(CONNECT_GLOBAL)).ok()?;
        if !connect.is_object() {
            return None;
        }
        let agent_app = Reflect::get(&connect, &JsValue::from_str("agentApp")).ok()?;
        if !agent_app.is_object() {
            return None;
        }
        let init_app = Reflect::get(&agent_app, &JsValue::from_str("initApp"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some((agent_app, init_app))
    }
}

impl WidgetHost for DocumentWidgets {
    fn find_frame(&self, frame_id: &str) -> Option<Rc<dyn WidgetFrame>> {
        let iframe = self
            .document
            .query_selector(&format!("iframe[id=\"{frame_id}\"]"))
            .ok()
            .flatten()?
            .dyn_into::<HtmlIFrameElement>()
            .ok()?;
        Some(Rc::new(IframeWidget::new(iframe)))
    }

    fn has_container(&self, container_id: &str) -> bool {
        self.document
            .query_selector(&format!("div[id=\"{container_id}\"]"))
            .ok()
            .flatten()
            .is_some()
    }

    fn create_container(&self, container_id: &str) -> Result<(), HostError> {
        let div = self.document.create_element("div").map_err(js_error)?;
        div.set_attribute("id", container_id).map_err(js_error)?;
        let body = self
            .document
            .body()
            .ok_or(HostError::Unavailable("document.body"))?;
        body.append_child(&div).map_err(js_error)?;
        Ok(())
    }

    fn init_app(&self, init: &AppInit) -> Result<(), HostError> {
        let (agent_app, init_app) = self
            .app_host()
            .ok_or(HostError::Unavailable("connect.agentApp.initApp"))?;

        let config = Object::new();
        Reflect::set(&config, &JsValue::from_str("style"), &JsValue::from_str(&init.style))
            .map_err(js_error)?;

        let args = Array::of4(
            &JsValue::from_str(&init.name),
            &JsValue::from_str(&init.container_id),
            &JsValue::from_str(&init.url),
            &config,
        );
        init_app.apply(&agent_app, &args).map_err(js_error)?;
        Ok(())
    }
}

type LoadListener = Closure<dyn FnMut(Event)>;
type PortListener = Closure<dyn FnMut(MessageEvent)>;

pub struct IframeWidget {
    iframe: HtmlIFrameElement,
    load_listeners: RefCell<Vec<LoadListener>>,
}

impl IframeWidget {
    #[must_use]
    pub fn new(iframe: HtmlIFrameElement) -> Self {
        Self {
            iframe,
            load_listeners: RefCell::new(Vec::new()),
        }
    }
}

impl WidgetFrame for IframeWidget {
    fn src(&self) -> String {
        self.iframe.src()
    }

    fn on_load(&self, callback: Box<dyn Fn()>) -> Result<(), HostError> {
        let listener = Closure::wrap(Box::new(move |_event: Event| callback()) as Box<dyn FnMut(Event)>);
        self.iframe
            .add_event_listener_with_callback("load", listener.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.load_listeners.borrow_mut().push(listener);
        Ok(())
    }

    fn exchange(&self, message: &BridgeMessage, target_origin: &str) -> Result<Reply, HostError> {
        let target = self
            .iframe
            .content_window()
            .ok_or(HostError::Unavailable("widget contentWindow"))?;
        let payload = to_js(&message.to_value())?;

        let channel = MessageChannel::new().map_err(js_error)?;
        let port1 = channel.port1();
        let port2 = channel.port2();

        let (tx, rx) = oneshot::channel::<Value>();
        let sender = RefCell::new(Some(tx));
        let holder: Rc<RefCell<Option<PortListener>>> = Rc::new(RefCell::new(None));
        let holder_for_cb = Rc::clone(&holder);
        let port_for_cb = port1.clone();

        let on_reply = Closure::wrap(Box::new(move |event: MessageEvent| {
            port_for_cb.set_onmessage(None);
            port_for_cb.close();
            if let Some(tx) = sender.borrow_mut().take() {
                // Undecodable replies surface as a bridge error on the caller.
                let data = from_js(&event.data()).unwrap_or(Value::Null);
                if tx.send(data).is_err() {
                    log::debug!("customer profiles: widget reply arrived after caller went away");
                }
            }
            holder_for_cb.borrow_mut().take();
        }) as Box<dyn FnMut(MessageEvent)>);

        port1.set_onmessage(Some(on_reply.as_ref().unchecked_ref()));
        *holder.borrow_mut() = Some(on_reply);

        if let Err(e) = target.post_message_with_transfer(&payload, target_origin, &Array::of1(&port2)) {
            port1.set_onmessage(None);
            port1.close();
            holder.borrow_mut().take();
            return Err(js_error(e));
        }
        Ok(rx)
    }
}

impl Drop for IframeWidget {
    fn drop(&mut self) {
        for listener in self.load_listeners.borrow_mut().drain(..) {
            if let Err(e) = self
                .iframe
                .remove_event_listener_with_callback("load", listener.as_ref().unchecked_ref())
            {
                log::warn!("customer profiles: failed to detach load listener: {}", js_error(e));
            }
        }
    }
}
