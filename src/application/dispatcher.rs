// Message dispatcher - classifies inbound frames and routes them into viewer state
use crate::domain::error::ViewerError;
use crate::domain::log_buffer::LogBuffer;
use crate::domain::protocol::{LegacyFrame, TypedFrame, LEGACY_SERIES};
use crate::domain::sample::{decode_timestamp, Sample};
use crate::domain::series_buffer::SeriesBuffer;
use crate::domain::threshold::{Level, ThresholdStore};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const KNOWN_TYPES: [&str; 3] = ["chart-data", "chart-threshold", "log-message"];

/// The three state containers the dispatcher mutates.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub series: SeriesBuffer,
    pub log: LogBuffer,
    pub thresholds: ThresholdStore,
}

impl ViewerState {
    pub fn new(series_capacity: usize, log_capacity: usize) -> Self {
        Self {
            series: SeriesBuffer::new(series_capacity),
            log: LogBuffer::new(log_capacity),
            thresholds: ThresholdStore::new(),
        }
    }
}

/// A decoded inbound frame, independent of the envelope it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Sample(Sample),
    Threshold { level: i64, value: f64 },
    Log(String),
}

/// Why a frame was dropped.
#[derive(Debug, Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Rejected(#[from] ViewerError),
    #[error("unknown message type {0:?}")]
    UnknownType(String),
    #[error("chart data carries no numeric series")]
    NoSeries,
}

#[derive(Debug)]
pub enum Dispatched {
    SamplePushed,
    ThresholdApplied(Level),
    LogAppended,
    Dropped(Diagnostic),
}

impl Dispatched {
    pub fn changed_state(&self) -> bool {
        !matches!(self, Dispatched::Dropped(_))
    }
}

/// Turns one raw text frame into an [`Inbound`] value.
pub trait FrameDecoder: Send {
    fn decode(&self, raw: &str) -> Result<Inbound, Diagnostic>;
}

/// Envelope with a `type` discriminator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedDecoder;

impl FrameDecoder for TypedDecoder {
    fn decode(&self, raw: &str) -> Result<Inbound, Diagnostic> {
        let value: Value = serde_json::from_str(raw).map_err(ViewerError::from)?;
        if !value.is_object() {
            return Err(ViewerError::Parse(format!("expected a JSON object, got {}", value)).into());
        }
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        if !KNOWN_TYPES.contains(&kind) {
            return Err(Diagnostic::UnknownType(kind.to_string()));
        }

        match TypedFrame::deserialize(value).map_err(ViewerError::from)? {
            TypedFrame::ChartData { ts, fields } => {
                let time_ms = decode_timestamp(&ts)?;
                Ok(Inbound::Sample(Sample::new(time_ms, numeric_fields(fields)?)))
            }
            TypedFrame::ChartThreshold { level, value } => Ok(Inbound::Threshold { level, value }),
            TypedFrame::LogMessage { message } => Ok(Inbound::Log(message)),
        }
    }
}

/// Envelope without a discriminator, told apart by field presence.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDecoder;

impl FrameDecoder for LegacyDecoder {
    fn decode(&self, raw: &str) -> Result<Inbound, Diagnostic> {
        match serde_json::from_str::<LegacyFrame>(raw).map_err(ViewerError::from)? {
            LegacyFrame::Sample { t, y } => {
                let time_ms = decode_timestamp(&t)?;
                let values = BTreeMap::from([(LEGACY_SERIES.to_string(), y)]);
                Ok(Inbound::Sample(Sample::new(time_ms, values)))
            }
            LegacyFrame::Text { text } => Ok(Inbound::Log(text)),
        }
    }
}

fn numeric_fields(fields: Map<String, Value>) -> Result<BTreeMap<String, f64>, Diagnostic> {
    let mut values = BTreeMap::new();
    for (name, value) in fields {
        match value.as_f64() {
            Some(v) => {
                values.insert(name, v);
            }
            None => tracing::debug!("skipping non-numeric series {}: {}", name, value),
        }
    }
    if values.is_empty() {
        return Err(Diagnostic::NoSeries);
    }
    Ok(values)
}

/// Which envelope style the data source speaks. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    Typed,
    Legacy,
}

pub struct MessageDispatcher {
    decoder: Box<dyn FrameDecoder>,
}

impl MessageDispatcher {
    pub fn new(decoder: Box<dyn FrameDecoder>) -> Self {
        Self { decoder }
    }

    pub fn for_envelope(envelope: Envelope) -> Self {
        match envelope {
            Envelope::Typed => Self::typed(),
            Envelope::Legacy => Self::legacy(),
        }
    }

    pub fn typed() -> Self {
        Self::new(Box::new(TypedDecoder))
    }

    pub fn legacy() -> Self {
        Self::new(Box::new(LegacyDecoder))
    }

    /// Decode and apply one frame. Failures are logged and returned as
    /// [`Dispatched::Dropped`]; they never leave the dispatcher as errors.
    pub fn on_message(&self, raw: &str, state: &mut ViewerState) -> Dispatched {
        let outcome = match self.decoder.decode(raw) {
            Ok(inbound) => Self::apply(inbound, state),
            Err(diagnostic) => Dispatched::Dropped(diagnostic),
        };
        if let Dispatched::Dropped(diagnostic) = &outcome {
            tracing::warn!("bad message {:?}: {}", raw, diagnostic);
        }
        outcome
    }

    fn apply(inbound: Inbound, state: &mut ViewerState) -> Dispatched {
        match inbound {
            Inbound::Sample(sample) => {
                state.series.push(sample);
                Dispatched::SamplePushed
            }
            Inbound::Threshold { level, value } => match state.thresholds.apply_remote(level, value) {
                Ok(level) => {
                    tracing::debug!("threshold level {} set to {} by server", level.get(), value);
                    Dispatched::ThresholdApplied(level)
                }
                Err(e) => Dispatched::Dropped(e.into()),
            },
            Inbound::Log(line) => {
                state.log.append(line);
                Dispatched::LogAppended
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ViewerState {
        ViewerState::new(100, 45)
    }

    #[test]
    fn test_chart_data_builds_one_sample() {
        let mut state = state();
        let outcome = MessageDispatcher::typed()
            .on_message(r#"{"type":"chart-data","ts":1000,"raw":1,"agd":2}"#, &mut state);

        assert!(matches!(outcome, Dispatched::SamplePushed));
        let snapshot = state.series.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].time_ms, 1000);
        assert_eq!(
            snapshot[0].values,
            BTreeMap::from([("raw".to_string(), 1.0), ("agd".to_string(), 2.0)])
        );
    }

    #[test]
    fn test_invalid_json_leaves_state_unchanged() {
        let mut state = state();
        let outcome = MessageDispatcher::typed().on_message("{not json", &mut state);

        assert!(matches!(outcome, Dispatched::Dropped(Diagnostic::Rejected(ViewerError::Parse(_)))));
        assert!(state.series.is_empty());
        assert!(state.log.is_empty());
        assert!(state.thresholds.set_values().is_empty());
    }

    #[test]
    fn test_threshold_and_log_routing() {
        let mut state = state();
        let dispatcher = MessageDispatcher::typed();

        let outcome =
            dispatcher.on_message(r#"{"type":"chart-threshold","level":2,"value":42}"#, &mut state);
        assert!(matches!(outcome, Dispatched::ThresholdApplied(l) if l.get() == 2));
        assert_eq!(state.thresholds.set_values(), vec![42.0]);

        let outcome =
            dispatcher.on_message(r#"{"type":"log-message","message":"I 12.345 web hi"}"#, &mut state);
        assert!(matches!(outcome, Dispatched::LogAppended));
        assert_eq!(state.log.last(), Some("I 12.345 web hi"));
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let mut state = state();
        let outcome = MessageDispatcher::typed().on_message(r#"{"type":"bogus","x":1}"#, &mut state);
        assert!(matches!(outcome, Dispatched::Dropped(Diagnostic::UnknownType(ref t)) if t == "bogus"));

        let outcome = MessageDispatcher::typed().on_message(r#"{"x":1}"#, &mut state);
        assert!(matches!(outcome, Dispatched::Dropped(Diagnostic::UnknownType(_))));
    }

    #[test]
    fn test_non_object_json_is_parse_error() {
        let mut state = state();
        let dispatcher = MessageDispatcher::typed();
        for raw in ["42", "[1]", r#""chart-data""#, "null"] {
            let outcome = dispatcher.on_message(raw, &mut state);
            assert!(
                matches!(outcome, Dispatched::Dropped(Diagnostic::Rejected(ViewerError::Parse(_)))),
                "{} should be a parse error",
                raw
            );
        }
        assert!(state.series.is_empty());
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_threshold_level_out_of_range_dropped() {
        let mut state = state();
        let outcome = MessageDispatcher::typed()
            .on_message(r#"{"type":"chart-threshold","level":4,"value":1}"#, &mut state);
        assert!(matches!(
            outcome,
            Dispatched::Dropped(Diagnostic::Rejected(ViewerError::InvalidLevel(4)))
        ));
        assert!(state.thresholds.set_values().is_empty());
    }

    #[test]
    fn test_chart_data_skips_non_numeric_fields() {
        let mut state = state();
        let dispatcher = MessageDispatcher::typed();
        dispatcher.on_message(r#"{"type":"chart-data","ts":1,"raw":3,"note":"x"}"#, &mut state);
        assert_eq!(state.series.series("raw"), vec![(1, 3.0)]);
        assert!(state.series.series("note").is_empty());

        let outcome = dispatcher.on_message(r#"{"type":"chart-data","ts":2,"note":"x"}"#, &mut state);
        assert!(matches!(outcome, Dispatched::Dropped(Diagnostic::NoSeries)));
        assert_eq!(state.series.len(), 1);
    }

    #[test]
    fn test_chart_data_with_iso_timestamp() {
        let mut state = state();
        MessageDispatcher::typed().on_message(
            r#"{"type":"chart-data","ts":"1970-01-01T00:00:01.000000","raw":1}"#,
            &mut state,
        );
        assert_eq!(state.series.latest().map(|s| s.time_ms), Some(1000));
    }

    #[test]
    fn test_legacy_envelope() {
        let mut state = state();
        let dispatcher = MessageDispatcher::legacy();

        assert!(matches!(
            dispatcher.on_message(r#"{"t":1000,"y":7.5}"#, &mut state),
            Dispatched::SamplePushed
        ));
        assert!(matches!(
            dispatcher.on_message(r#"{"text":"arduino ready"}"#, &mut state),
            Dispatched::LogAppended
        ));
        assert!(matches!(
            dispatcher.on_message(r#"{"neither":true}"#, &mut state),
            Dispatched::Dropped(_)
        ));

        assert_eq!(state.series.series(LEGACY_SERIES), vec![(1000, 7.5)]);
        assert_eq!(state.log.lines().collect::<Vec<_>>(), vec!["arduino ready"]);
    }
}
