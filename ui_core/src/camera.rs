// Camera session state and single-frame capture.
// Rule: at most one stream exists; releasing it is idempotent and callable from anywhere.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::config::CameraSettings;
use crate::error::{CameraError, UiError};

/// Device seam. `Stream` is the live handle (a `MediaStream` in the browser).
#[allow(async_fn_in_trait)]
pub trait Camera {
    type Stream;

    /// Whether the runtime exposes a camera API at all.
    fn is_supported(&self) -> bool;

    /// Acquire a video-only stream, bind it to the video surface, wait for
    /// metadata and start playback.
    async fn open(&self, settings: &CameraSettings) -> Result<Self::Stream, CameraError>;

    /// Grab the current frame. `Ok(None)` while the surface has no decoded
    /// dimensions yet.
    fn grab_frame(&self, stream: &Self::Stream) -> Result<Option<RawFrame>, CameraError>;

    /// Stop every track and detach the stream from the surface.
    fn close(&self, stream: Self::Stream);
}

/// An RGBA still taken from the video surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, UiError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(UiError::Encoding(format!(
                "frame buffer of {} bytes does not match {}x{} RGBA",
                rgba.len(),
                width,
                height
            )));
        }
        Ok(RawFrame {
            width,
            height,
            rgba,
        })
    }

    /// Encode as JPEG. `quality` is 0.0-1.0 like `canvas.toDataURL`.
    pub fn encode_jpeg(&self, quality: f32) -> Result<Vec<u8>, UiError> {
        let rgb: Vec<u8> = self
            .rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut out = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality));
            encoder.encode(&rgb, self.width, self.height, ExtendedColorType::Rgb8)?;
        }
        Ok(out)
    }

    /// Encode and embed as `data:image/jpeg;base64,...`.
    pub fn to_data_url(&self, quality: f32) -> Result<String, UiError> {
        let jpeg = self.encode_jpeg(quality)?;
        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}

/// Lifecycle of the single camera session.
#[derive(Debug)]
pub enum CameraState<S> {
    Idle,
    /// Acquisition requested, stream not yet granted.
    Starting,
    Active(S),
}

impl<S> Default for CameraState<S> {
    fn default() -> Self {
        CameraState::Idle
    }
}

impl<S> CameraState<S> {
    pub fn is_idle(&self) -> bool {
        matches!(self, CameraState::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CameraState::Active(_))
    }

    /// Reset to idle, handing back the stream if one was live.
    pub fn release(&mut self) -> Option<S> {
        match std::mem::take(self) {
            CameraState::Active(stream) => Some(stream),
            CameraState::Idle | CameraState::Starting => None,
        }
    }

    /// Finish a pending acquisition. Returns the stream back when the
    /// session was released while it was being acquired.
    pub fn activate(&mut self, stream: S) -> Result<(), S> {
        match self {
            CameraState::Starting => {
                *self = CameraState::Active(stream);
                Ok(())
            }
            CameraState::Idle | CameraState::Active(_) => Err(stream),
        }
    }

    pub fn stream(&self) -> Option<&S> {
        match self {
            CameraState::Active(stream) => Some(stream),
            CameraState::Idle | CameraState::Starting => None,
        }
    }
}
