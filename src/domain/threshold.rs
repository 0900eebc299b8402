// Threshold domain model - three editable alert levels overlaid on the chart
use crate::domain::error::{ViewerError, ViewerResult};

pub const LEVEL_COUNT: usize = 3;

/// A validated threshold level in 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub fn new(level: i64) -> ViewerResult<Self> {
        if (1..=LEVEL_COUNT as i64).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(ViewerError::InvalidLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Level> {
        (1..=LEVEL_COUNT as u8).map(Level)
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub level: Level,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    values: [Option<f64>; LEVEL_COUNT],
}

impl ThresholdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; values are never removed, only overwritten.
    pub fn apply_remote(&mut self, level: i64, value: f64) -> ViewerResult<Level> {
        let level = Level::new(level)?;
        self.set(level, value);
        Ok(level)
    }

    pub fn set(&mut self, level: Level, value: f64) {
        self.values[level.index()] = Some(value);
    }

    pub fn get(&self, level: Level) -> Option<f64> {
        self.values[level.index()]
    }

    pub fn thresholds(&self) -> Vec<Threshold> {
        Level::all()
            .map(|level| Threshold {
                level,
                value: self.get(level),
            })
            .collect()
    }

    /// Values of the levels that have been set, in level order.
    pub fn set_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }
}
