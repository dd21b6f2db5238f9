// ui_core: Rust/WASM session core for the emotion console.
// The session, rendering rules and wire handling are plain Rust; the browser
// is reached only through the Backend, Camera and View seams (web/ on wasm32).

pub mod api;
pub mod camera;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod text;
pub mod types;
pub mod view;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
mod web;

pub use api::{Api, Backend, HttpReply};
pub use camera::{Camera, CameraState, RawFrame};
pub use config::{CameraSettings, UiConfig};
pub use error::{CameraError, ErrorClass, UiError};
pub use render::{BreakdownRow, HistoryRow, ResultView, SentimentView, StatTile};
pub use session::Session;
pub use text::{CharCount, CountLevel, KeyPress, Shortcut};
pub use types::*;
pub use view::{CameraLayout, Control, Notice, NoticeKind, View};

#[cfg(target_arch = "wasm32")]
pub use web::App;

/// Initialize panic hook for better error messages in browser console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_builds_from_default_config() {
        let journal = testing::Journal::default();
        let session = Session::new(
            UiConfig::from_json("").unwrap(),
            testing::FakeBackend::with_journal(journal.clone()),
            testing::FakeCamera::new(journal.clone()),
            testing::FakeView { journal },
        );
        assert_eq!(session.mode(), Mode::Text);
        assert_eq!(session.analyses(), 0);
        assert!(!session.camera_active());
    }
}
