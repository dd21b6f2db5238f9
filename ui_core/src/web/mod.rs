// Browser entry point: owns the session and wires page events to its commands.
// JS only constructs an App and calls mount(); everything else happens here.

mod dom;
mod http;
mod logging;
mod media;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use log::info;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget, HtmlTextAreaElement, KeyboardEvent};

use crate::config::UiConfig;
use crate::session::Session;
use crate::text::{resolve_shortcut, KeyPress, Shortcut};
use crate::types::Mode;

use dom::DomView;
use http::HttpBackend;
use media::WebCamera;

type WebSession = Session<HttpBackend, WebCamera, DomView>;

/// An event listener that detaches itself when dropped.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Listener {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// The emotion console, mounted on the current page.
#[wasm_bindgen]
pub struct App {
    session: Rc<WebSession>,
    listeners: RefCell<Vec<Listener>>,
    refresh: RefCell<Option<Interval>>,
}

#[wasm_bindgen]
impl App {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<App, JsValue> {
        let config = UiConfig::from_json(config_json).map_err(|e| js_error("Invalid config", e))?;
        let level = config.log_filter().map_err(|e| js_error("Invalid config", e))?;
        logging::init(level);

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;
        let view = DomView::new(document, config.notice_ms);
        let camera = WebCamera::new(view.by_id(dom::VIDEO)?, view.by_id(dom::CANVAS)?);

        Ok(App {
            session: Rc::new(Session::new(config, HttpBackend, camera, view)),
            listeners: RefCell::new(Vec::new()),
            refresh: RefCell::new(None),
        })
    }

    /// Attach listeners, paint the initial state and start periodic refresh.
    pub fn mount(&self) -> Result<(), JsValue> {
        self.teardown();

        let listeners = self.wire()?;
        *self.listeners.borrow_mut() = listeners;

        let session = Rc::clone(&self.session);
        spawn_local(async move { session.start().await });

        let session = Rc::clone(&self.session);
        let interval = Interval::new(self.session.config().refresh_interval_ms, move || {
            let session = Rc::clone(&session);
            spawn_local(async move { session.refresh_all().await });
        });
        *self.refresh.borrow_mut() = Some(interval);
        Ok(())
    }

    /// Detach listeners, stop the refresh timer and release the camera.
    pub fn teardown(&self) {
        self.listeners.borrow_mut().clear();
        self.refresh.borrow_mut().take();
        self.session.teardown();
    }

    /// Put a random example into the text input.
    pub fn load_example(&self) {
        self.session.load_example(js_sys::Math::random());
    }

    pub fn analyses(&self) -> f64 {
        self.session.analyses() as f64
    }
}

impl App {
    fn wire(&self) -> Result<Vec<Listener>, JsValue> {
        let view = self.session.view();
        let document = view.document().clone();
        let input: HtmlTextAreaElement = view.by_id(dom::TEXT_INPUT)?;
        let mut listeners = Vec::new();

        let tabs = document.query_selector_all(dom::MODE_TABS)?;
        for i in 0..tabs.length() {
            let Some(tab) = tabs.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let session = Rc::clone(&self.session);
            let target = tab.clone();
            listeners.push(Listener::attach(&tab, "click", move |_| {
                let mode = target.get_attribute("data-mode");
                match mode.as_deref().and_then(Mode::from_tab) {
                    Some(mode) => {
                        session.switch_mode(mode);
                    }
                    None => info!("Ignoring unknown mode tab {:?}", mode),
                }
            })?);
        }

        let session = Rc::clone(&self.session);
        let source = input.clone();
        listeners.push(Listener::attach(&input, "input", move |_| {
            session.input_changed(&source.value());
        })?);

        let session = Rc::clone(&self.session);
        let source = input.clone();
        let analyze: Element = view.by_id(dom::ANALYZE_BTN)?;
        listeners.push(Listener::attach(&analyze, "click", move |_| {
            let session = Rc::clone(&session);
            let text = source.value();
            spawn_local(async move {
                let _ = session.submit_text(&text).await;
            });
        })?);

        let session = Rc::clone(&self.session);
        let start: Element = view.by_id(dom::START_CAMERA_BTN)?;
        listeners.push(Listener::attach(&start, "click", move |_| {
            let session = Rc::clone(&session);
            spawn_local(async move {
                let _ = session.start_camera().await;
            });
        })?);

        let session = Rc::clone(&self.session);
        let capture: Element = view.by_id(dom::CAPTURE_BTN)?;
        listeners.push(Listener::attach(&capture, "click", move |_| {
            let session = Rc::clone(&session);
            spawn_local(async move {
                let _ = session.capture_and_analyze().await;
            });
        })?);

        let session = Rc::clone(&self.session);
        let stop: Element = view.by_id(dom::STOP_CAMERA_BTN)?;
        listeners.push(Listener::attach(&stop, "click", move |_| {
            session.stop_camera();
        })?);

        let session = Rc::clone(&self.session);
        let source = input.clone();
        listeners.push(Listener::attach(&document, "keydown", move |event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = key_event.key();
            let press = KeyPress {
                key: &key,
                ctrl: key_event.ctrl_key(),
                meta: key_event.meta_key(),
                in_text_input: event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .is_some_and(|el| el.id() == dom::TEXT_INPUT),
            };
            let Some(shortcut) = resolve_shortcut(press) else {
                return;
            };
            if matches!(shortcut, Shortcut::Submit | Shortcut::FocusInput) {
                event.prevent_default();
            }

            let session = Rc::clone(&session);
            let ctrl = press.ctrl;
            let meta = press.meta;
            let in_text_input = press.in_text_input;
            let text = source.value();
            spawn_local(async move {
                let press = KeyPress {
                    key: &key,
                    ctrl,
                    meta,
                    in_text_input,
                };
                session.handle_key(press, &text).await;
            });
        })?);

        let session = Rc::clone(&self.session);
        let window: EventTarget = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window available"))?
            .into();
        listeners.push(Listener::attach(&window, "pagehide", move |_| {
            session.teardown();
        })?);

        Ok(listeners)
    }
}
