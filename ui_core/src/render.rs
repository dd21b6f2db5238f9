// Pure view-model builders. Nothing here touches a rendering surface, so a result
// either becomes a complete view model or nothing is painted at all.

use std::cmp::Ordering;

use crate::types::*;

pub const POSITIVE_COLOR: &str = "#10b981";
pub const NEGATIVE_COLOR: &str = "#ef4444";
pub const NEUTRAL_COLOR: &str = "#9ca3af";
pub const HIGH_SUBJECTIVITY_COLOR: &str = "#8b5cf6";
pub const LOW_SUBJECTIVITY_COLOR: &str = "#3b82f6";

/// Segments at or below this percentage carry no label inside their fill.
const INNER_LABEL_MIN_PERCENT: u32 = 10;

/// Score in [0, 1] as a whole percentage.
pub fn percent(score: f32) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub emotion: EmotionKind,
    pub glyph: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub confidence_percent: u32,
    pub confidence_label: String,
    pub breakdown: Vec<BreakdownRow>,
    pub sentiment: Option<SentimentView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub emotion: EmotionKind,
    pub glyph: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub percent: u32,
    /// Label drawn inside the fill; `None` when the segment is too narrow.
    pub inner_label: Option<String>,
    /// Numeric readout beside the bar, always present.
    pub readout: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentView {
    pub polarity: String,
    pub polarity_color: &'static str,
    pub subjectivity: String,
    pub subjectivity_color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub emotion: EmotionKind,
    pub glyph: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub confidence: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatTile {
    pub value: String,
    pub label: String,
    pub glyph: Option<&'static str>,
    pub color: Option<&'static str>,
}

pub fn result_view(result: &AnalysisResult) -> ResultView {
    let style = result.emotion.style();
    let confidence_percent = percent(result.confidence);

    ResultView {
        emotion: result.emotion,
        glyph: style.glyph,
        label: style.label,
        color: style.color,
        confidence_percent,
        confidence_label: format!("Confidence: {}%", confidence_percent),
        breakdown: breakdown(&result.distribution),
        sentiment: result.sentiment.map(sentiment_view),
    }
}

/// One row per scored emotion, highest score first. Ties keep server order.
pub fn breakdown(distribution: &[(EmotionKind, f32)]) -> Vec<BreakdownRow> {
    let mut sorted = distribution.to_vec();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    sorted
        .into_iter()
        .map(|(emotion, score)| {
            let style = emotion.style();
            let percent = percent(score);
            BreakdownRow {
                emotion,
                glyph: style.glyph,
                label: style.label,
                color: style.color,
                percent,
                inner_label: (percent > INNER_LABEL_MIN_PERCENT).then(|| format!("{}%", percent)),
                readout: format!("{}%", percent),
            }
        })
        .collect()
}

pub fn sentiment_view(sentiment: Sentiment) -> SentimentView {
    let polarity_color = if sentiment.polarity > 0.0 {
        POSITIVE_COLOR
    } else if sentiment.polarity < 0.0 {
        NEGATIVE_COLOR
    } else {
        NEUTRAL_COLOR
    };
    let subjectivity_color = if sentiment.subjectivity > 0.5 {
        HIGH_SUBJECTIVITY_COLOR
    } else {
        LOW_SUBJECTIVITY_COLOR
    };

    SentimentView {
        polarity: format!("{:.2}", sentiment.polarity),
        polarity_color,
        subjectivity: format!("{:.2}", sentiment.subjectivity),
        subjectivity_color,
    }
}

/// History rows in reverse of fetch order.
pub fn history_rows(entries: &[HistoryEntry]) -> Vec<HistoryRow> {
    entries
        .iter()
        .rev()
        .map(|entry| {
            let style = entry.emotion.style();
            HistoryRow {
                emotion: entry.emotion,
                glyph: style.glyph,
                label: style.label,
                color: style.color,
                confidence: format!("{}%", percent(entry.confidence)),
                text: format!("\"{}\"", entry.text),
                timestamp: display_timestamp(entry),
            }
        })
        .collect()
}

/// Timestamp in the browser's locale; the raw string when the backend sent
/// something unparseable.
#[cfg(target_arch = "wasm32")]
pub fn display_timestamp(entry: &HistoryEntry) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_str(&entry.timestamp));
    if entry.recorded_at.is_none() || date.get_time().is_nan() {
        return entry.timestamp.clone();
    }
    date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED)
        .into()
}

/// `3/14/2025, 9:26:53 AM` outside the browser; the raw string when the
/// backend sent something unparseable.
#[cfg(not(target_arch = "wasm32"))]
pub fn display_timestamp(entry: &HistoryEntry) -> String {
    match entry.recorded_at {
        Some(at) => at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => entry.timestamp.clone(),
    }
}

/// Total tile first, then one tile per emotion by count, highest first.
pub fn stat_tiles(stats: &StatsSnapshot) -> Vec<StatTile> {
    let mut counts = stats.emotion_counts.clone();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut tiles = Vec::with_capacity(counts.len() + 1);
    tiles.push(StatTile {
        value: stats.total_detections.to_string(),
        label: "Total Analyses".to_string(),
        glyph: None,
        color: None,
    });
    tiles.extend(counts.into_iter().map(|(emotion, count)| {
        let style = emotion.style();
        StatTile {
            value: count.to_string(),
            label: style.label.to_string(),
            glyph: Some(style.glyph),
            color: Some(style.color),
        }
    }));
    tiles
}
