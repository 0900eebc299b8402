// Sample domain model - one timestamped, multi-series data point
use crate::domain::error::{ViewerError, ViewerResult};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time_ms: i64,
    pub values: BTreeMap<String, f64>,
}

impl Sample {
    pub fn new(time_ms: i64, values: BTreeMap<String, f64>) -> Self {
        Self { time_ms, values }
    }

    pub fn value(&self, series: &str) -> Option<f64> {
        self.values.get(series).copied()
    }
}

/// Decode a wire timestamp into epoch milliseconds.
///
/// Accepts epoch milliseconds (integer or float) or an ISO-8601 string. Strings
/// without an offset are taken as UTC.
pub fn decode_timestamp(ts: &Value) -> ViewerResult<i64> {
    match ts {
        Value::Number(n) => {
            if let Some(ms) = n.as_i64() {
                Ok(ms)
            } else if let Some(ms) = n.as_f64().filter(|f| f.is_finite()) {
                Ok(ms.trunc() as i64)
            } else {
                Err(ViewerError::Parse(format!("timestamp out of range: {}", n)))
            }
        }
        Value::String(s) => parse_iso(s)
            .ok_or_else(|| ViewerError::Parse(format!("unrecognised timestamp: {:?}", s))),
        other => Err(ViewerError::Parse(format!("timestamp must be a number or string, got {}", other))),
    }
}

fn parse_iso(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_epoch_ms() {
        assert_eq!(decode_timestamp(&json!(1000)).unwrap(), 1000);
        assert_eq!(decode_timestamp(&json!(1500.7)).unwrap(), 1500);
    }

    #[test]
    fn test_decode_iso_with_offset() {
        let ms = decode_timestamp(&json!("1970-01-01T00:00:01+00:00")).unwrap();
        assert_eq!(ms, 1000);
    }

    #[test]
    fn test_decode_naive_iso_as_utc() {
        let ms = decode_timestamp(&json!("1970-01-01T00:00:02.500000")).unwrap();
        assert_eq!(ms, 2500);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_timestamp(&json!("yesterday")), Err(ViewerError::Parse(_))));
        assert!(matches!(decode_timestamp(&json!(true)), Err(ViewerError::Parse(_))));
        assert!(matches!(decode_timestamp(&Value::Null), Err(ViewerError::Parse(_))));
    }
}
