// Series buffer - fixed-capacity sliding window of timestamp-aligned samples
use crate::domain::sample::Sample;
use std::collections::VecDeque;

/// Padding applied on both sides of the value axis.
pub const AXIS_PADDING: f64 = 5.0;

/// One buffer shared by every series that arrives in the same frame, so that
/// all named series stay aligned on the same timestamps.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append at the tail; once over capacity the oldest sample is evicted.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Current window, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Points of one named series, as (time_ms, value) pairs.
    pub fn series(&self, name: &str) -> Vec<(i64, f64)> {
        self.samples
            .iter()
            .filter_map(|s| s.value(name).map(|v| (s.time_ms, v)))
            .collect()
    }

    /// Min and max over every value currently held, across all series.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .flat_map(|s| s.values.values().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Value-axis range covering the data bounds and every set threshold, padded by
/// [`AXIS_PADDING`] on each side.
pub fn axis_range(data: Option<(f64, f64)>, thresholds: &[f64]) -> Option<(f64, f64)> {
    let bounds = thresholds.iter().fold(data, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    Some((bounds.0 - AXIS_PADDING, bounds.1 + AXIS_PADDING))
}
