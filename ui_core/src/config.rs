// Session configuration passed from JS as JSON. Every field is optional.

use serde::{Deserialize, Serialize};

use crate::error::UiError;

/// Top-level configuration for a UI session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Prefix joined to every endpoint path. Empty means same origin.
    #[serde(default)]
    pub api_base: String,
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// Character count above which the counter turns amber.
    #[serde(default = "default_warn_chars")]
    pub warn_chars: usize,
    /// Character count above which the counter turns red.
    #[serde(default = "default_critical_chars")]
    pub critical_chars: usize,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u32,
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    /// JPEG quality for captured frames, 0.0 exclusive to 1.0.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: f32,
    #[serde(default)]
    pub camera: CameraSettings,
    /// How long a notification stays visible.
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Preferred camera constraints. The browser treats them as ideals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
    #[serde(default = "default_facing_mode")]
    pub facing_mode: String,
    /// How long a granted stream may take to report its dimensions.
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
            facing_mode: default_facing_mode(),
            metadata_timeout_ms: default_metadata_timeout_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            api_base: String::new(),
            max_text_chars: default_max_text_chars(),
            warn_chars: default_warn_chars(),
            critical_chars: default_critical_chars(),
            refresh_interval_ms: default_refresh_interval_ms(),
            history_limit: default_history_limit(),
            jpeg_quality: default_jpeg_quality(),
            camera: CameraSettings::default(),
            notice_ms: default_notice_ms(),
            log_level: default_log_level(),
        }
    }
}

fn default_max_text_chars() -> usize {
    5000
}

fn default_warn_chars() -> usize {
    4000
}

fn default_critical_chars() -> usize {
    4500
}

fn default_refresh_interval_ms() -> u32 {
    30_000
}

fn default_history_limit() -> u32 {
    10
}

fn default_jpeg_quality() -> f32 {
    0.8
}

fn default_notice_ms() -> u32 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ideal_width() -> u32 {
    640
}

fn default_ideal_height() -> u32 {
    480
}

fn default_facing_mode() -> String {
    "user".to_string()
}

fn default_metadata_timeout_ms() -> u32 {
    10_000
}

impl UiConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, UiError> {
        let config: UiConfig = if json.trim().is_empty() {
            UiConfig::default()
        } else {
            serde_json::from_str(json).map_err(|e| UiError::InvalidConfig(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), UiError> {
        if self.max_text_chars == 0 {
            return Err(UiError::InvalidConfig(
                "max_text_chars must be positive".to_string(),
            ));
        }
        if self.warn_chars > self.critical_chars || self.critical_chars > self.max_text_chars {
            return Err(UiError::InvalidConfig(format!(
                "counter thresholds must satisfy warn <= critical <= max ({} / {} / {})",
                self.warn_chars, self.critical_chars, self.max_text_chars
            )));
        }
        if !(self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0) {
            return Err(UiError::InvalidConfig(format!(
                "jpeg_quality must be in (0, 1], got {}",
                self.jpeg_quality
            )));
        }
        if self.camera.metadata_timeout_ms == 0 {
            return Err(UiError::InvalidConfig(
                "camera.metadata_timeout_ms must be positive".to_string(),
            ));
        }
        if self.refresh_interval_ms == 0 {
            return Err(UiError::InvalidConfig(
                "refresh_interval_ms must be positive".to_string(),
            ));
        }
        self.log_filter()?;
        Ok(())
    }

    pub fn log_filter(&self) -> Result<log::LevelFilter, UiError> {
        self.log_level
            .parse()
            .map_err(|_| UiError::InvalidConfig(format!("unknown log level: {}", self.log_level)))
    }

    /// Join an endpoint path onto `api_base`.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}{}", base, path)
    }
}
