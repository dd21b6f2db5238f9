// Strong typing over strings. Server tags become EmotionKind exactly once, at the API edge.

use chrono::NaiveDateTime;

/// Display configuration for one emotion kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionStyle {
    pub glyph: &'static str,
    pub color: &'static str,
    pub label: &'static str,
}

/// The closed set of emotions the console can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmotionKind {
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
    Neutral,
    Disgust,
    Confused,
    Tired,
    Excited,
    Bored,
    Anxious,
    Calm,
    Frustrated,
    Content,
    Worried,
}

impl EmotionKind {
    pub const ALL: [EmotionKind; 16] = [
        EmotionKind::Happy,
        EmotionKind::Sad,
        EmotionKind::Angry,
        EmotionKind::Fear,
        EmotionKind::Surprise,
        EmotionKind::Neutral,
        EmotionKind::Disgust,
        EmotionKind::Confused,
        EmotionKind::Tired,
        EmotionKind::Excited,
        EmotionKind::Bored,
        EmotionKind::Anxious,
        EmotionKind::Calm,
        EmotionKind::Frustrated,
        EmotionKind::Content,
        EmotionKind::Worried,
    ];

    /// Wire tag as sent by the backend.
    pub fn tag(&self) -> &'static str {
        match self {
            EmotionKind::Happy => "happy",
            EmotionKind::Sad => "sad",
            EmotionKind::Angry => "angry",
            EmotionKind::Fear => "fear",
            EmotionKind::Surprise => "surprise",
            EmotionKind::Neutral => "neutral",
            EmotionKind::Disgust => "disgust",
            EmotionKind::Confused => "confused",
            EmotionKind::Tired => "tired",
            EmotionKind::Excited => "excited",
            EmotionKind::Bored => "bored",
            EmotionKind::Anxious => "anxious",
            EmotionKind::Calm => "calm",
            EmotionKind::Frustrated => "frustrated",
            EmotionKind::Content => "content",
            EmotionKind::Worried => "worried",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn style(&self) -> EmotionStyle {
        let (glyph, color, label) = match self {
            EmotionKind::Happy => ("😊", "#fbbf24", "Happy"),
            EmotionKind::Sad => ("😢", "#60a5fa", "Sad"),
            EmotionKind::Angry => ("😠", "#ef4444", "Angry"),
            EmotionKind::Fear => ("😨", "#a78bfa", "Fear"),
            EmotionKind::Surprise => ("😲", "#f97316", "Surprise"),
            EmotionKind::Neutral => ("😐", "#9ca3af", "Neutral"),
            EmotionKind::Disgust => ("🤢", "#84cc16", "Disgust"),
            EmotionKind::Confused => ("😕", "#f59e0b", "Confused"),
            EmotionKind::Tired => ("😫", "#6b7280", "Tired"),
            EmotionKind::Excited => ("🤩", "#ec4899", "Excited"),
            EmotionKind::Bored => ("😑", "#64748b", "Bored"),
            EmotionKind::Anxious => ("😰", "#8b5cf6", "Anxious"),
            EmotionKind::Calm => ("😌", "#10b981", "Calm"),
            EmotionKind::Frustrated => ("😤", "#dc2626", "Frustrated"),
            EmotionKind::Content => ("😊", "#059669", "Content"),
            EmotionKind::Worried => ("😟", "#7c3aed", "Worried"),
        };
        EmotionStyle {
            glyph,
            color,
            label,
        }
    }
}

/// Sentiment scores. Only text analyses carry them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub polarity: f32,     // -1.0 to 1.0
    pub subjectivity: f32, // 0.0 to 1.0
}

/// One analysis as returned by the backend, already validated against the emotion table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub emotion: EmotionKind,
    pub confidence: f32,
    /// Independent per-emotion scores in server order; need not sum to 1.
    pub distribution: Vec<(EmotionKind, f32)>,
    pub sentiment: Option<Sentiment>,
}

/// Facial analysis plus the number of faces the backend found.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnalysis {
    pub result: AnalysisResult,
    pub faces_detected: u32,
}

/// Which input produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    Text,
    Face,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub emotion: EmotionKind,
    pub confidence: f32,
    pub text: String,
    /// Timestamp exactly as the backend sent it.
    pub timestamp: String,
    pub recorded_at: Option<NaiveDateTime>,
    pub source: Option<DetectionSource>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsSnapshot {
    pub total_detections: u64,
    /// Counts in server order.
    pub emotion_counts: Vec<(EmotionKind, u64)>,
}

/// Input mode tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Text,
    Face,
    /// Placeholder tab; not implemented.
    Speech,
}

impl Mode {
    /// Parse a tab's `data-mode` attribute.
    pub fn from_tab(value: &str) -> Option<Self> {
        match value.trim() {
            "text" => Some(Mode::Text),
            "face" => Some(Mode::Face),
            "speech" => Some(Mode::Speech),
            _ => None,
        }
    }

    pub fn tab(&self) -> &'static str {
        match self {
            Mode::Text => "text",
            Mode::Face => "face",
            Mode::Speech => "speech",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Mode::Speech)
    }
}

/// Parse the timestamp formats the backend emits (ISO 8601 with or without
/// offset, and SQLite's `YYYY-MM-DD HH:MM:SS`).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
