// Threshold edit workflow - operator prompt and server sync
use crate::domain::error::ViewerResult;
use crate::domain::protocol::Command;
use crate::domain::threshold::{Level, ThresholdStore};
use serde::Deserialize;

/// How a confirmed edit reaches the threshold store. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Send `set_threshold` and wait for the server's `chart-threshold` push.
    Authoritative,
    /// Update the store immediately and tell nobody.
    Optimistic,
}

/// Synchronous source of the operator's replacement value.
pub trait OperatorPrompt {
    /// `None` means the prompt was dismissed.
    fn ask(&mut self, question: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Non-numeric or dismissed response; nothing happened.
    Abandoned,
    /// The server must confirm the value.
    Requested(Command),
    /// The store was updated locally.
    Applied { level: Level, value: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdEditor {
    mode: ThresholdMode,
}

impl ThresholdEditor {
    pub fn new(mode: ThresholdMode) -> Self {
        Self { mode }
    }

    pub fn request_edit(
        &self,
        level: i64,
        prompt: &mut dyn OperatorPrompt,
        store: &mut ThresholdStore,
    ) -> ViewerResult<EditOutcome> {
        let level = Level::new(level)?;
        let question = format!("New level {} threshold:", level.get());
        let Some(value) = prompt.ask(&question).as_deref().and_then(parse_int_prefix) else {
            tracing::debug!("threshold edit for level {} abandoned", level.get());
            return Ok(EditOutcome::Abandoned);
        };

        match self.mode {
            ThresholdMode::Authoritative => Ok(EditOutcome::Requested(Command::SetThreshold {
                level: level.get(),
                value,
            })),
            ThresholdMode::Optimistic => {
                store.set(level, value as f64);
                Ok(EditOutcome::Applied {
                    level,
                    value: value as f64,
                })
            }
        }
    }
}

/// Parse the leading decimal integer of `input`: whitespace is skipped, an
/// optional sign is accepted, trailing garbage is ignored.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
