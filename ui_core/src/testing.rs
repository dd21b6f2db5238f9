// Recording fakes for the Backend, Camera and View seams. Test-only.
// All three share one Journal so tests can assert cross-seam ordering.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;

use crate::api::{Backend, HttpReply};
use crate::camera::{Camera, RawFrame};
use crate::config::CameraSettings;
use crate::error::{CameraError, UiError};
use crate::render::{HistoryRow, ResultView, StatTile};
use crate::text::CharCount;
use crate::types::Mode;
use crate::view::{CameraLayout, Control, Notice, View};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Request(Call),
    View(ViewEvent),
    CameraOpened(u32),
    CameraClosed(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ShowMode(Mode),
    CharCount(CharCount),
    TextInput(String),
    FocusInput,
    ControlEnabled(Control, bool),
    Busy(bool),
    Layout(CameraLayout),
    ShowResult(ResultView),
    HideResult,
    History(Vec<HistoryRow>),
    Stats(Vec<StatTile>),
    Notify(Notice),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Request(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    pub fn view_events(&self) -> Vec<ViewEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::View(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.view_events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Notify(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }
}

type Gate = (&'static str, oneshot::Receiver<()>);

/// Backend answering from a per-path routing table.
#[derive(Default)]
pub struct FakeBackend {
    pub journal: Journal,
    routes: RefCell<Vec<(&'static str, Result<HttpReply, UiError>)>>,
    gates: RefCell<Vec<Gate>>,
}

impl FakeBackend {
    pub fn with_journal(journal: Journal) -> Self {
        FakeBackend {
            journal,
            routes: RefCell::default(),
            gates: RefCell::default(),
        }
    }

    /// Make the next request to `path` wait until the returned sender fires.
    pub fn hold_next(&self, path: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push((path, rx));
        tx
    }

    pub fn respond(&self, path: &'static str, reply: HttpReply) {
        self.route(path, Ok(reply));
    }

    pub fn fail(&self, path: &'static str, err: UiError) {
        self.route(path, Err(err));
    }

    fn route(&self, path: &'static str, outcome: Result<HttpReply, UiError>) {
        let mut routes = self.routes.borrow_mut();
        routes.retain(|(p, _)| *p != path);
        routes.push((path, outcome));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.calls()
    }

    async fn answer(
        &self,
        method: &'static str,
        url: &str,
        body: Option<String>,
    ) -> Result<HttpReply, UiError> {
        self.journal.push(Event::Request(Call {
            method,
            url: url.to_string(),
            body,
        }));
        let path = url.split('?').next().unwrap_or(url);

        let gate = {
            let mut gates = self.gates.borrow_mut();
            gates
                .iter()
                .position(|(p, _)| path.ends_with(*p))
                .map(|i| gates.remove(i).1)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.routes
            .borrow()
            .iter()
            .find(|(p, _)| path.ends_with(*p))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Err(UiError::Transport("Failed to fetch".to_string())))
    }
}

impl Backend for FakeBackend {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpReply, UiError> {
        self.answer("POST", url, Some(body)).await
    }

    async fn get(&self, url: &str) -> Result<HttpReply, UiError> {
        self.answer("GET", url, None).await
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FakeStream(pub u32);

/// Camera handing out numbered streams and tracking which are still live.
pub struct FakeCamera {
    pub journal: Journal,
    pub supported: Cell<bool>,
    pub open_error: RefCell<Option<CameraError>>,
    pub frame: RefCell<Option<RawFrame>>,
    pub settings_seen: RefCell<Option<CameraSettings>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    next_id: Cell<u32>,
    live: RefCell<Vec<u32>>,
}

impl FakeCamera {
    pub fn new(journal: Journal) -> Self {
        FakeCamera {
            journal,
            supported: Cell::new(true),
            open_error: RefCell::new(None),
            frame: RefCell::new(Some(tiny_frame())),
            settings_seen: RefCell::new(None),
            gate: RefCell::new(None),
            next_id: Cell::new(1),
            live: RefCell::new(Vec::new()),
        }
    }

    /// Make the next `open` wait until the returned sender fires.
    pub fn hold_next_open(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }

    pub fn live_streams(&self) -> Vec<u32> {
        self.live.borrow().clone()
    }
}

impl Camera for FakeCamera {
    type Stream = FakeStream;

    fn is_supported(&self) -> bool {
        self.supported.get()
    }

    async fn open(&self, settings: &CameraSettings) -> Result<FakeStream, CameraError> {
        *self.settings_seen.borrow_mut() = Some(settings.clone());
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.open_error.borrow_mut().take() {
            return Err(err);
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().push(id);
        self.journal.push(Event::CameraOpened(id));
        Ok(FakeStream(id))
    }

    fn grab_frame(&self, _stream: &FakeStream) -> Result<Option<RawFrame>, CameraError> {
        Ok(self.frame.borrow().clone())
    }

    fn close(&self, stream: FakeStream) {
        self.live.borrow_mut().retain(|id| *id != stream.0);
        self.journal.push(Event::CameraClosed(stream.0));
    }
}

pub fn tiny_frame() -> RawFrame {
    RawFrame::new(4, 4, vec![200; 4 * 4 * 4]).expect("valid frame")
}

/// View that records every call.
pub struct FakeView {
    pub journal: Journal,
}

impl FakeView {
    fn record(&self, event: ViewEvent) {
        self.journal.push(Event::View(event));
    }
}

impl View for FakeView {
    fn show_mode(&self, mode: Mode) {
        self.record(ViewEvent::ShowMode(mode));
    }

    fn set_char_count(&self, count: &CharCount) {
        self.record(ViewEvent::CharCount(count.clone()));
    }

    fn set_text_input(&self, text: &str) {
        self.record(ViewEvent::TextInput(text.to_string()));
    }

    fn focus_text_input(&self) {
        self.record(ViewEvent::FocusInput);
    }

    fn set_control_enabled(&self, control: Control, enabled: bool) {
        self.record(ViewEvent::ControlEnabled(control, enabled));
    }

    fn set_busy(&self, busy: bool) {
        self.record(ViewEvent::Busy(busy));
    }

    fn set_camera_layout(&self, layout: CameraLayout) {
        self.record(ViewEvent::Layout(layout));
    }

    fn show_result(&self, result: &ResultView) {
        self.record(ViewEvent::ShowResult(result.clone()));
    }

    fn hide_result(&self) {
        self.record(ViewEvent::HideResult);
    }

    fn show_history(&self, rows: &[HistoryRow]) {
        self.record(ViewEvent::History(rows.to_vec()));
    }

    fn show_stats(&self, tiles: &[StatTile]) {
        self.record(ViewEvent::Stats(tiles.to_vec()));
    }

    fn notify(&self, notice: &Notice) {
        self.record(ViewEvent::Notify(notice.clone()));
    }
}
