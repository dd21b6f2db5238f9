// Backend endpoints: request shaping and response interpretation.
// The transport itself sits behind the Backend trait so this module stays pure.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::UiConfig;
use crate::error::UiError;
use crate::types::*;

pub const DETECT_PATH: &str = "/api/detect";
pub const DETECT_FACE_PATH: &str = "/api/detect-face";
pub const HISTORY_PATH: &str = "/api/history";
pub const STATS_PATH: &str = "/api/stats";

/// Raw HTTP reply handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpReply {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam. Implementations only move bytes; a network failure is a
/// `UiError::Transport` carrying the transport's own message.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpReply, UiError>;
    async fn get(&self, url: &str) -> Result<HttpReply, UiError>;
}

/// Fallback texts used when a failed reply carries no message of its own.
#[derive(Debug, Clone, Copy)]
struct Fallbacks {
    status: &'static str,
    rejected: &'static str,
}

const TEXT_FALLBACKS: Fallbacks = Fallbacks {
    status: "Failed to analyze emotion",
    rejected: "Failed to analyze emotion",
};

const FACE_FALLBACKS: Fallbacks = Fallbacks {
    status: "Failed to detect emotion",
    rejected: "Detection failed",
};

const HISTORY_FALLBACKS: Fallbacks = Fallbacks {
    status: "Failed to load history",
    rejected: "Failed to load history",
};

const STATS_FALLBACKS: Fallbacks = Fallbacks {
    status: "Failed to load statistics",
    rejected: "Failed to load statistics",
};

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct FaceRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectReply {
    emotion: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    all_emotions: Map<String, Value>,
    sentiment: Option<SentimentReply>,
    faces_detected: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SentimentReply {
    polarity: Option<f64>,
    subjectivity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HistoryReply {
    #[serde(default)]
    history: Vec<HistoryItemReply>,
}

#[derive(Debug, Deserialize)]
struct HistoryItemReply {
    emotion: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    timestamp: String,
    #[serde(rename = "type")]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsReply {
    stats: StatsBody,
}

#[derive(Debug, Deserialize)]
struct StatsBody {
    #[serde(default, alias = "total")]
    total_detections: u64,
    #[serde(default, alias = "emotions")]
    emotion_counts: Map<String, Value>,
}

/// Typed client over a [`Backend`].
pub struct Api<B> {
    backend: B,
    base: String,
    history_limit: u32,
}

impl<B: Backend> Api<B> {
    pub fn new(backend: B, config: &UiConfig) -> Self {
        Api {
            backend,
            base: config.endpoint(""),
            history_limit: config.history_limit,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// `POST /api/detect` with already-validated text.
    pub async fn detect_text(&self, text: &str) -> Result<AnalysisResult, UiError> {
        let body = serde_json::to_string(&TextRequest { text })?;
        let url = self.url(DETECT_PATH);
        debug!("POST {} ({} chars)", url, text.chars().count());
        let reply = self.backend.post_json(&url, body).await?;
        interpret_text_reply(&reply)
    }

    /// `POST /api/detect-face` with a JPEG data URL.
    pub async fn detect_face(&self, data_url: &str) -> Result<FaceAnalysis, UiError> {
        let body = serde_json::to_string(&FaceRequest { image: data_url })?;
        let url = self.url(DETECT_FACE_PATH);
        debug!("POST {} ({} bytes)", url, body.len());
        let reply = self.backend.post_json(&url, body).await?;
        debug!("{} answered {}", url, reply.status);
        interpret_face_reply(&reply)
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, UiError> {
        let url = format!("{}?limit={}", self.url(HISTORY_PATH), self.history_limit);
        let reply = self.backend.get(&url).await?;
        interpret_history_reply(&reply)
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, UiError> {
        let url = self.url(STATS_PATH);
        let reply = self.backend.get(&url).await?;
        interpret_stats_reply(&reply)
    }
}

/// Apply the uniform failure rule: non-2xx or `success != true` is a
/// transport failure with the most specific message available.
fn envelope<T: DeserializeOwned>(reply: &HttpReply, fallbacks: Fallbacks) -> Result<T, UiError> {
    let value: Value = match serde_json::from_str(&reply.body) {
        Ok(value) => value,
        Err(_) if !reply.is_success() => {
            return Err(UiError::Transport(fallbacks.status.to_string()));
        }
        Err(err) => return Err(UiError::InvalidResponse(err.to_string())),
    };

    let detail = ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string);

    if !reply.is_success() {
        return Err(UiError::Transport(
            detail.unwrap_or_else(|| fallbacks.status.to_string()),
        ));
    }
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(UiError::Transport(
            detail.unwrap_or_else(|| fallbacks.rejected.to_string()),
        ));
    }

    serde_json::from_value(value).map_err(|e| UiError::InvalidResponse(e.to_string()))
}

fn emotion_from_tag(tag: &str) -> Result<EmotionKind, UiError> {
    EmotionKind::from_tag(tag).ok_or_else(|| UiError::UnknownEmotion(tag.to_string()))
}

fn score(tag: &str, value: &Value) -> Result<f32, UiError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v as f32)
        .ok_or_else(|| UiError::InvalidResponse(format!("score for '{}' is not a number", tag)))
}

fn to_analysis(reply: DetectReply) -> Result<AnalysisResult, UiError> {
    let tag = reply
        .emotion
        .ok_or_else(|| UiError::InvalidResponse("missing emotion".to_string()))?;
    let emotion = emotion_from_tag(&tag)?;
    let confidence = reply
        .confidence
        .filter(|c| c.is_finite())
        .ok_or_else(|| UiError::InvalidResponse("missing confidence".to_string()))?
        as f32;

    let distribution = reply
        .all_emotions
        .iter()
        .map(|(tag, value)| Ok((emotion_from_tag(tag)?, score(tag, value)?)))
        .collect::<Result<Vec<_>, UiError>>()?;

    let sentiment = reply.sentiment.and_then(|s| match (s.polarity, s.subjectivity) {
        (Some(polarity), Some(subjectivity)) => Some(Sentiment {
            polarity: polarity as f32,
            subjectivity: subjectivity as f32,
        }),
        _ => None,
    });

    Ok(AnalysisResult {
        emotion,
        confidence,
        distribution,
        sentiment,
    })
}

pub fn interpret_text_reply(reply: &HttpReply) -> Result<AnalysisResult, UiError> {
    to_analysis(envelope(reply, TEXT_FALLBACKS)?)
}

pub fn interpret_face_reply(reply: &HttpReply) -> Result<FaceAnalysis, UiError> {
    let detect: DetectReply = envelope(reply, FACE_FALLBACKS)?;
    let faces_detected = detect.faces_detected.unwrap_or(1);
    Ok(FaceAnalysis {
        result: to_analysis(detect)?,
        faces_detected,
    })
}

pub fn interpret_history_reply(reply: &HttpReply) -> Result<Vec<HistoryEntry>, UiError> {
    let history: HistoryReply = envelope(reply, HISTORY_FALLBACKS)?;
    history
        .history
        .into_iter()
        .map(|item| {
            Ok(HistoryEntry {
                emotion: emotion_from_tag(&item.emotion)?,
                confidence: item.confidence as f32,
                recorded_at: parse_timestamp(&item.timestamp),
                timestamp: item.timestamp,
                text: item.text,
                source: match item.source.as_deref() {
                    Some("text") => Some(DetectionSource::Text),
                    Some("face") => Some(DetectionSource::Face),
                    _ => None,
                },
            })
        })
        .collect()
}

pub fn interpret_stats_reply(reply: &HttpReply) -> Result<StatsSnapshot, UiError> {
    let stats: StatsReply = envelope(reply, STATS_FALLBACKS)?;
    let emotion_counts = stats
        .stats
        .emotion_counts
        .iter()
        .map(|(tag, value)| {
            let count = value.as_u64().ok_or_else(|| {
                UiError::InvalidResponse(format!("count for '{}' is not an integer", tag))
            })?;
            Ok((emotion_from_tag(tag)?, count))
        })
        .collect::<Result<Vec<_>, UiError>>()?;

    Ok(StatsSnapshot {
        total_detections: stats.stats.total_detections,
        emotion_counts,
    })
}
