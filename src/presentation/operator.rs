// Operator console - one input line per operator event
use crate::application::threshold_editor::OperatorPrompt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorEvent {
    /// `response` is what the operator typed at the threshold prompt.
    EditThreshold { level: i64, response: Option<String> },
    ToggleMark,
    ClearLog,
    ChangeLevel(i64),
    SetLogLevel { namespace: String, level: String },
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub fn parse_operator_line(line: &str) -> Result<OperatorEvent, InputError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(InputError::Empty)?;

    match command {
        "edit" => {
            let level = words
                .next()
                .and_then(|w| w.parse().ok())
                .ok_or(InputError::Usage("edit <level> [value]"))?;
            let rest: Vec<&str> = words.collect();
            let response = (!rest.is_empty()).then(|| rest.join(" "));
            Ok(OperatorEvent::EditThreshold { level, response })
        }
        "mark" => Ok(OperatorEvent::ToggleMark),
        "clear" => Ok(OperatorEvent::ClearLog),
        "level" => words
            .next()
            .and_then(|w| w.parse().ok())
            .map(OperatorEvent::ChangeLevel)
            .ok_or(InputError::Usage("level <n>")),
        "loglevel" => match (words.next(), words.next()) {
            (Some(namespace), Some(level)) => Ok(OperatorEvent::SetLogLevel {
                namespace: namespace.to_string(),
                level: level.to_string(),
            }),
            _ => Err(InputError::Usage("loglevel <namespace> <level>")),
        },
        "quit" | "exit" => Ok(OperatorEvent::Quit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}

/// Prompt answered by text the operator already supplied on the command line.
#[derive(Debug, Clone)]
pub struct PresetResponse(pub Option<String>);

impl OperatorPrompt for PresetResponse {
    fn ask(&mut self, question: &str) -> Option<String> {
        tracing::debug!("{} {:?}", question, self.0);
        self.0.take()
    }
}
