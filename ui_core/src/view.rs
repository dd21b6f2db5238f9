// Rendering surface seam. The session only ever talks to the page through this trait.

use crate::render::{HistoryRow, ResultView, StatTile};
use crate::text::CharCount;
use crate::types::Mode;

/// Controls that are disabled while their request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Analyze,
    Capture,
}

/// Overlay and button layout of the camera panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraLayout {
    /// Overlay and "start" visible; "capture" and "stop" hidden.
    Idle,
    /// Overlay and "start" hidden; "capture" and "stop" visible.
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the session can do to the page. Implementations swallow and
/// log their own surface errors; the session never fails because of them.
pub trait View {
    /// Show the panel of `mode`, hide the others, highlight its tab.
    fn show_mode(&self, mode: Mode);
    fn set_char_count(&self, count: &CharCount);
    fn set_text_input(&self, text: &str);
    fn focus_text_input(&self);
    fn set_control_enabled(&self, control: Control, enabled: bool);
    fn set_busy(&self, busy: bool);
    fn set_camera_layout(&self, layout: CameraLayout);
    /// Reveal the results panel, scroll it into view and paint `result`.
    fn show_result(&self, result: &ResultView);
    fn hide_result(&self);
    fn show_history(&self, rows: &[HistoryRow]);
    fn show_stats(&self, tiles: &[StatTile]);
    fn notify(&self, notice: &Notice);
}
