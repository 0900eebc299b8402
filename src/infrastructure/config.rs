use crate::application::dispatcher::Envelope;
use crate::application::session::{LevelAction, SessionSettings};
use crate::application::threshold_editor::ThresholdMode;
use crate::domain::error::{ViewerError, ViewerResult};
use serde::Deserialize;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";

/// Deployment presets matching the two known viewer variants.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Rich,
    Simple,
}

impl Profile {
    fn defaults(self) -> SessionSettings {
        match self {
            Profile::Rich => SessionSettings {
                series_capacity: 100,
                log_capacity: 45,
                envelope: Envelope::Typed,
                threshold_mode: ThresholdMode::Authoritative,
                level_action: LevelAction::ChangePlayLevel,
            },
            Profile::Simple => SessionSettings {
                series_capacity: 600,
                log_capacity: 20,
                envelope: Envelope::Legacy,
                threshold_mode: ThresholdMode::Optimistic,
                level_action: LevelAction::ChangeLevel,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewerConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub profile: Profile,
    pub series_capacity: Option<usize>,
    pub log_capacity: Option<usize>,
    pub envelope: Option<Envelope>,
    pub threshold_mode: Option<ThresholdMode>,
    pub level_action: Option<LevelAction>,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

impl ViewerConfig {
    /// Profile defaults with any explicit keys layered on top.
    pub fn session_settings(&self) -> ViewerResult<SessionSettings> {
        let defaults = self.profile.defaults();
        let settings = SessionSettings {
            series_capacity: self.series_capacity.unwrap_or(defaults.series_capacity),
            log_capacity: self.log_capacity.unwrap_or(defaults.log_capacity),
            envelope: self.envelope.unwrap_or(defaults.envelope),
            threshold_mode: self.threshold_mode.unwrap_or(defaults.threshold_mode),
            level_action: self.level_action.unwrap_or(defaults.level_action),
        };
        if settings.series_capacity == 0 || settings.log_capacity == 0 {
            return Err(ViewerError::Config("buffer capacities must be at least 1".to_string()));
        }
        Ok(settings)
    }
}

/// Reads `config/viewer.*` when present, then `VIEWER_*` environment variables.
pub fn load_viewer_config() -> anyhow::Result<ViewerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/viewer").required(false))
        .add_source(config::Environment::with_prefix("VIEWER").try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}
