// Text input rules: submission validation, the live character counter, keyboard shortcuts.

use crate::config::UiConfig;
use crate::error::UiError;

/// Canned inputs for quick manual testing.
pub const EXAMPLE_TEXTS: [&str; 6] = [
    "I am so happy and excited about this amazing opportunity!",
    "This is terrible and makes me really angry and frustrated.",
    "I'm feeling sad and lonely today, missing my friends.",
    "That was such a shocking and unexpected surprise!",
    "I'm worried and afraid about what might happen next.",
    "Everything is just okay, nothing special happening.",
];

/// Pick an example for a uniform sample in `[0, 1)`.
pub fn example_text(pick: f64) -> &'static str {
    let index = (pick.clamp(0.0, 1.0) * EXAMPLE_TEXTS.len() as f64) as usize;
    EXAMPLE_TEXTS[index.min(EXAMPLE_TEXTS.len() - 1)]
}

/// Why a text submission was rejected locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRejection {
    Empty,
    TooLong { max: usize },
}

impl TextRejection {
    pub fn message(&self) -> String {
        match self {
            TextRejection::Empty => "Please enter some text to analyze".to_string(),
            TextRejection::TooLong { max } => {
                format!("Text is too long. Maximum {} characters allowed.", max)
            }
        }
    }
}

impl From<TextRejection> for UiError {
    fn from(rejection: TextRejection) -> Self {
        UiError::Validation(rejection.message())
    }
}

/// Trim and bound-check raw input. Length is counted in characters.
pub fn validate_text(raw: &str, max_chars: usize) -> Result<&str, TextRejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(TextRejection::Empty);
    }
    if text.chars().count() > max_chars {
        return Err(TextRejection::TooLong { max: max_chars });
    }
    Ok(text)
}

/// Severity band of the character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLevel {
    Normal,
    Warning,
    Critical,
}

impl CountLevel {
    pub fn color(&self) -> &'static str {
        match self {
            CountLevel::Normal => "#94a3b8",
            CountLevel::Warning => "#f59e0b",
            CountLevel::Critical => "#ef4444",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharCount {
    pub length: usize,
    pub max: usize,
    pub level: CountLevel,
}

impl CharCount {
    /// Counter for the raw (untrimmed) input.
    pub fn measure(raw: &str, config: &UiConfig) -> Self {
        let length = raw.chars().count();
        let level = if length > config.critical_chars {
            CountLevel::Critical
        } else if length > config.warn_chars {
            CountLevel::Warning
        } else {
            CountLevel::Normal
        };
        CharCount {
            length,
            max: config.max_text_chars,
            level,
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {} characters", self.length, self.max)
    }
}

/// Keyboard shortcut actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Submit,
    FocusInput,
    ClearInput,
}

/// A key press as seen by the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPress<'a> {
    pub key: &'a str,
    pub ctrl: bool,
    pub meta: bool,
    /// Whether the text input had focus when the key was pressed.
    pub in_text_input: bool,
}

pub fn resolve_shortcut(press: KeyPress<'_>) -> Option<Shortcut> {
    match press.key {
        "Enter" if press.ctrl && press.in_text_input => Some(Shortcut::Submit),
        "k" | "K" if press.ctrl || press.meta => Some(Shortcut::FocusInput),
        "Escape" if press.in_text_input => Some(Shortcut::ClearInput),
        _ => None,
    }
}
