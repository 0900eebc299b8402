// Wire protocol - inbound frame envelopes and outbound commands
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed envelope: every frame carries a `type` discriminator.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TypedFrame {
    ChartData {
        ts: Value,
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    ChartThreshold {
        level: i64,
        value: f64,
    },
    LogMessage {
        message: String,
    },
}

/// Legacy envelope without a discriminator: a numeric `y` field marks a sample,
/// a `text` field marks a log line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyFrame {
    Sample { t: Value, y: f64 },
    Text { text: String },
}

/// Series name used for samples decoded from the legacy envelope.
pub const LEGACY_SERIES: &str = "y";

/// Outbound command frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    SetThreshold { level: u8, value: i64 },
    ChangePlayLevel { level: i64 },
    ChangeLevel { level: i64 },
    SetLogLevel { namespace: String, level: String },
}

impl Command {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
