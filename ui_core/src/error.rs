// Typed errors with thiserror. Every variant renders as the text shown to the user.

use thiserror::Error;

/// Camera acquisition and capture failures, one variant per actionable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Failed to access camera. Please allow camera permissions.")]
    PermissionDenied,

    #[error("Failed to access camera. No camera found on this device.")]
    NotFound,

    #[error("Failed to access camera. Camera is already in use by another application.")]
    InUse,

    #[error("Failed to access camera. Camera API not supported in this browser")]
    Unsupported,

    #[error("Failed to access camera. {}", other_detail(.0))]
    Other(String),
}

fn other_detail(message: &str) -> &str {
    if message.trim().is_empty() {
        "Please check your camera."
    } else {
        message
    }
}

impl CameraError {
    /// Map a `DOMException.name` from `getUserMedia` onto a camera error.
    pub fn from_dom_name(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" => CameraError::PermissionDenied,
            "NotFoundError" | "OverconstrainedError" => CameraError::NotFound,
            "NotReadableError" | "AbortError" => CameraError::InUse,
            "NotSupportedError" | "TypeError" => CameraError::Unsupported,
            _ => CameraError::Other(message.to_string()),
        }
    }
}

/// Coarse class of a [`UiError`], used for log routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Transport,
    Device,
    Data,
    Internal,
}

/// Errors surfaced by the session core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Network failure, non-2xx status, or a `success: false` payload.
    #[error("{0}")]
    Transport(String),

    #[error(transparent)]
    Device(#[from] CameraError),

    #[error("Unknown emotion kind from server: {0}")]
    UnknownEmotion(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to encode captured frame: {0}")]
    Encoding(String),
}

impl UiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            UiError::Validation(_) => ErrorClass::Validation,
            UiError::Transport(_) => ErrorClass::Transport,
            UiError::Device(_) => ErrorClass::Device,
            UiError::UnknownEmotion(_) | UiError::InvalidResponse(_) => ErrorClass::Data,
            UiError::InvalidConfig(_) | UiError::Serialization(_) | UiError::Encoding(_) => {
                ErrorClass::Internal
            }
        }
    }
}

impl From<serde_json::Error> for UiError {
    fn from(err: serde_json::Error) -> Self {
        UiError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for UiError {
    fn from(err: image::ImageError) -> Self {
        UiError::Encoding(err.to_string())
    }
}
