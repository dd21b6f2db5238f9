// The UI session: current mode, the camera session, in-flight guards and the
// analysis counter, plus every command handler the page adapter invokes.
// Rule: no RefCell borrow is held across an .await.

use std::cell::{Cell, RefCell};

use log::{debug, error, info, warn};

use crate::api::{Api, Backend};
use crate::camera::{Camera, CameraState};
use crate::config::UiConfig;
use crate::error::{CameraError, ErrorClass, UiError};
use crate::render::{history_rows, result_view, stat_tiles};
use crate::text::{resolve_shortcut, validate_text, CharCount, KeyPress, Shortcut, TextRejection};
use crate::types::*;
use crate::view::{CameraLayout, Control, Notice, View};

const CAMERA_NOT_ACTIVE: &str = "Camera is not active. Please start the camera first.";
const VIDEO_NOT_READY: &str = "Video not ready. Please wait a moment and try again.";
const ALREADY_RUNNING: &str = "An analysis is already in progress";

/// Disables a control for the lifetime of one request. Dropping it re-enables
/// the control and clears the busy indicator, whatever the outcome.
struct InFlight<'a, V: View> {
    view: &'a V,
    control: Control,
    flag: &'a Cell<bool>,
}

impl<'a, V: View> InFlight<'a, V> {
    fn begin(view: &'a V, control: Control, flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        view.set_control_enabled(control, false);
        view.set_busy(true);
        Some(InFlight {
            view,
            control,
            flag,
        })
    }
}

impl<V: View> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.view.set_control_enabled(self.control, true);
        self.view.set_busy(false);
        self.flag.set(false);
    }
}

/// One browser tab's worth of UI state.
pub struct Session<B, C: Camera, V> {
    config: UiConfig,
    api: Api<B>,
    camera: C,
    view: V,
    mode: Cell<Mode>,
    camera_state: RefCell<CameraState<C::Stream>>,
    text_in_flight: Cell<bool>,
    capture_in_flight: Cell<bool>,
    /// Bumped on every camera request; a grant for an older one is stale.
    camera_attempt: Cell<u64>,
    analyses: Cell<u64>,
}

impl<B: Backend, C: Camera, V: View> Session<B, C, V> {
    pub fn new(config: UiConfig, backend: B, camera: C, view: V) -> Self {
        Session {
            api: Api::new(backend, &config),
            config,
            camera,
            view,
            mode: Cell::new(Mode::Text),
            camera_state: RefCell::new(CameraState::Idle),
            text_in_flight: Cell::new(false),
            capture_in_flight: Cell::new(false),
            camera_attempt: Cell::new(0),
            analyses: Cell::new(0),
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Successful analyses during this session.
    pub fn analyses(&self) -> u64 {
        self.analyses.get()
    }

    pub fn camera_active(&self) -> bool {
        self.camera_state.borrow().is_active()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Initial layout and first history/stats load.
    pub async fn start(&self) {
        info!("Emotion console session started");
        self.view.show_mode(self.mode.get());
        self.input_changed("");
        self.view.set_camera_layout(CameraLayout::Idle);
        self.refresh_all().await;
    }

    /// Release everything the session holds. Safe to call repeatedly.
    pub fn teardown(&self) {
        self.stop_camera();
    }

    // ---------------------------------------------------------------------
    // Mode controller
    // ---------------------------------------------------------------------

    /// Returns `false` when `target` is a placeholder and nothing changed.
    pub fn switch_mode(&self, target: Mode) -> bool {
        if !target.is_available() {
            debug!("{} mode is not implemented; staying in {}", target.tab(), self.mode.get().tab());
            return false;
        }

        info!("Switching to {} mode", target.tab());
        self.mode.set(target);
        self.view.show_mode(target);
        if target != Mode::Face {
            self.stop_camera();
        }
        self.view.hide_result();
        true
    }

    // ---------------------------------------------------------------------
    // Text submission
    // ---------------------------------------------------------------------

    pub fn input_changed(&self, raw: &str) {
        self.view.set_char_count(&CharCount::measure(raw, &self.config));
    }

    pub fn load_example(&self, pick: f64) {
        let text = crate::text::example_text(pick);
        self.view.set_text_input(text);
        self.input_changed(text);
        self.view.focus_text_input();
    }

    /// Run the action bound to `press`, if any. `input` is the current
    /// content of the text input.
    pub async fn handle_key(&self, press: KeyPress<'_>, input: &str) -> Option<Shortcut> {
        let shortcut = resolve_shortcut(press)?;
        match shortcut {
            Shortcut::Submit => {
                // Failures were already reported to the user.
                let _ = self.submit_text(input).await;
            }
            Shortcut::FocusInput => self.view.focus_text_input(),
            Shortcut::ClearInput => {
                self.view.set_text_input("");
                self.input_changed("");
            }
        }
        Some(shortcut)
    }

    pub async fn submit_text(&self, raw: &str) -> Result<AnalysisResult, UiError> {
        if self.text_in_flight.get() {
            debug!("Text analysis already in flight; ignoring submit");
            return Err(UiError::Validation(ALREADY_RUNNING.to_string()));
        }

        let text = match validate_text(raw, self.config.max_text_chars) {
            Ok(text) => text,
            Err(rejection) => {
                if rejection == TextRejection::Empty {
                    self.view.focus_text_input();
                }
                let err = UiError::from(rejection);
                self.report(&err);
                return Err(err);
            }
        };

        let Some(guard) = InFlight::begin(&self.view, Control::Analyze, &self.text_in_flight)
        else {
            return Err(UiError::Validation(ALREADY_RUNNING.to_string()));
        };

        let outcome = self.analyze_text(text).await;
        if let Err(err) = &outcome {
            self.report(err);
        }
        drop(guard);
        outcome
    }

    async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, UiError> {
        let issued_in = self.mode.get();
        let result = self.api.detect_text(text).await?;

        self.paint_result(issued_in, &result);
        self.refresh_history().await;
        self.refresh_stats().await;
        self.analyses.set(self.analyses.get() + 1);

        info!(
            "Text analysis complete: {} ({:.2}); history and stats refreshed",
            result.emotion.tag(),
            result.confidence
        );
        self.view.notify(&Notice::success("Emotion analyzed successfully!"));
        Ok(result)
    }

    /// Results only belong to the mode they were requested from.
    fn paint_result(&self, issued_in: Mode, result: &AnalysisResult) {
        if self.mode.get() == issued_in {
            self.view.show_result(&result_view(result));
        } else {
            info!(
                "Not showing {} result requested in {} mode",
                result.emotion.tag(),
                issued_in.tab()
            );
        }
    }

    // ---------------------------------------------------------------------
    // Camera capture
    // ---------------------------------------------------------------------

    /// Idle -> Active. A no-op unless the camera is idle.
    pub async fn start_camera(&self) -> Result<(), UiError> {
        if !self.camera_state.borrow().is_idle() {
            debug!("Camera already starting or active");
            return Ok(());
        }
        if !self.camera.is_supported() {
            let err = UiError::from(CameraError::Unsupported);
            self.report(&err);
            return Err(err);
        }

        *self.camera_state.borrow_mut() = CameraState::Starting;
        let attempt = self.camera_attempt.get() + 1;
        self.camera_attempt.set(attempt);
        info!("Requesting camera access");

        let opened = self.camera.open(&self.config.camera).await;
        if self.camera_attempt.get() != attempt {
            debug!("Camera request {} was superseded", attempt);
            if let Ok(stream) = opened {
                self.camera.close(stream);
            }
            return Ok(());
        }

        match opened {
            Ok(stream) => {
                let activated = self.camera_state.borrow_mut().activate(stream);
                match activated {
                    Ok(()) => {
                        self.view.set_camera_layout(CameraLayout::Live);
                        self.view.notify(&Notice::success("Camera started successfully!"));
                        info!("Camera started and ready");
                    }
                    Err(stream) => {
                        info!("Camera was released while starting; closing the late stream");
                        self.camera.close(stream);
                    }
                }
                Ok(())
            }
            Err(device) => {
                {
                    let mut state = self.camera_state.borrow_mut();
                    if matches!(*state, CameraState::Starting) {
                        *state = CameraState::Idle;
                    }
                }
                let err = UiError::from(device);
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Active -> Idle. Idempotent.
    pub fn stop_camera(&self) {
        let released = self.camera_state.borrow_mut().release();
        if let Some(stream) = released {
            self.camera.close(stream);
            self.view.set_camera_layout(CameraLayout::Idle);
            info!("Camera stopped");
        }
    }

    pub async fn capture_and_analyze(&self) -> Result<FaceAnalysis, UiError> {
        if self.capture_in_flight.get() {
            debug!("Facial analysis already in flight; ignoring capture");
            return Err(UiError::Validation(ALREADY_RUNNING.to_string()));
        }

        let data_url = match self.capture_frame() {
            Ok(url) => url,
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };
        debug!("Frame captured ({} bytes); sending for analysis", data_url.len());

        let Some(guard) = InFlight::begin(&self.view, Control::Capture, &self.capture_in_flight)
        else {
            return Err(UiError::Validation(ALREADY_RUNNING.to_string()));
        };

        let outcome = self.analyze_face(&data_url).await;
        if let Err(err) = &outcome {
            self.report(err);
        }
        drop(guard);
        outcome
    }

    fn capture_frame(&self) -> Result<String, UiError> {
        let frame = {
            let state = self.camera_state.borrow();
            let stream = state
                .stream()
                .ok_or_else(|| UiError::Validation(CAMERA_NOT_ACTIVE.to_string()))?;
            self.camera
                .grab_frame(stream)?
                .ok_or_else(|| UiError::Validation(VIDEO_NOT_READY.to_string()))?
        };
        frame.to_data_url(self.config.jpeg_quality)
    }

    async fn analyze_face(&self, data_url: &str) -> Result<FaceAnalysis, UiError> {
        let issued_in = self.mode.get();
        let face = self.api.detect_face(data_url).await?;

        self.paint_result(issued_in, &face.result);
        self.refresh_history().await;
        self.refresh_stats().await;
        self.analyses.set(self.analyses.get() + 1);

        info!(
            "Facial analysis complete: {} from {} face(s); history and stats refreshed",
            face.result.emotion.tag(),
            face.faces_detected
        );
        self.view.notify(&Notice::success(faces_message(face.faces_detected)));
        Ok(face)
    }

    // ---------------------------------------------------------------------
    // History and stats
    // ---------------------------------------------------------------------

    /// Returns whether the list was repainted. Failures only log.
    pub async fn refresh_history(&self) -> bool {
        match self.api.history().await {
            Ok(entries) if entries.is_empty() => false,
            Ok(entries) => {
                self.view.show_history(&history_rows(&entries));
                true
            }
            Err(err) => {
                warn!("Could not load history: {}", err);
                false
            }
        }
    }

    /// Returns whether the grid was repainted. Failures only log.
    pub async fn refresh_stats(&self) -> bool {
        match self.api.stats().await {
            Ok(stats) => {
                self.view.show_stats(&stat_tiles(&stats));
                true
            }
            Err(err) => {
                warn!("Could not load stats: {}", err);
                false
            }
        }
    }

    /// Timer tick: history, then stats.
    pub async fn refresh_all(&self) {
        self.refresh_history().await;
        self.refresh_stats().await;
    }

    fn report(&self, err: &UiError) {
        match err.class() {
            ErrorClass::Validation => info!("Rejected: {}", err),
            ErrorClass::Device => warn!("Camera error: {}", err),
            ErrorClass::Transport | ErrorClass::Data | ErrorClass::Internal => {
                error!("Analysis failed: {}", err)
            }
        }
        self.view.notify(&Notice::error(err.to_string()));
    }
}

fn faces_message(faces: u32) -> String {
    if faces > 1 {
        format!("Emotion detected from {} faces!", faces)
    } else {
        "Emotion detected from 1 face!".to_string()
    }
}
