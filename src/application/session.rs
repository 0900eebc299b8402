// Session controller - owns viewer state and the connection lifecycle
//
// Connecting -> Open -> Closed. Closed is terminal: no reconnection is
// attempted, a new session has to be started instead.
use crate::application::dispatcher::{Dispatched, Envelope, MessageDispatcher, ViewerState};
use crate::application::threshold_editor::{
    EditOutcome, OperatorPrompt, ThresholdEditor, ThresholdMode,
};
use crate::domain::error::{ViewerError, ViewerResult};
use crate::domain::log_buffer::{CONNECTION_LOST_LINE, CONNECTION_UP_LINE, NOT_CONNECTED_LINE};
use crate::domain::protocol::Command;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Action name used for play-level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelAction {
    ChangePlayLevel,
    ChangeLevel,
}

impl LevelAction {
    fn command(self, level: i64) -> Command {
        match self {
            LevelAction::ChangePlayLevel => Command::ChangePlayLevel { level },
            LevelAction::ChangeLevel => Command::ChangeLevel { level },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub series_capacity: usize,
    pub log_capacity: usize,
    pub envelope: Envelope,
    pub threshold_mode: ThresholdMode,
    pub level_action: LevelAction,
}

/// Outbound half of the persistent connection.
pub trait CommandSink: Send {
    fn send_text(&mut self, text: String) -> ViewerResult<()>;
}

/// External surface notified after every visible state change.
pub trait RenderSurface {
    fn redraw(&mut self, state: &ViewerState);
}

pub struct SessionController<S: RenderSurface> {
    state: ViewerState,
    connection: ConnectionState,
    dispatcher: MessageDispatcher,
    editor: ThresholdEditor,
    level_action: LevelAction,
    sink: Option<Box<dyn CommandSink>>,
    surface: S,
}

impl<S: RenderSurface> SessionController<S> {
    pub fn init(settings: SessionSettings, sink: Box<dyn CommandSink>, surface: S) -> Self {
        tracing::info!(
            "session starting: envelope={:?} thresholds={:?} series={} log={}",
            settings.envelope,
            settings.threshold_mode,
            settings.series_capacity,
            settings.log_capacity
        );
        Self {
            state: ViewerState::new(settings.series_capacity, settings.log_capacity),
            connection: ConnectionState::Connecting,
            dispatcher: MessageDispatcher::for_envelope(settings.envelope),
            editor: ThresholdEditor::new(settings.threshold_mode),
            level_action: settings.level_action,
            sink: Some(sink),
            surface,
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn on_open(&mut self) {
        if self.connection != ConnectionState::Connecting {
            tracing::warn!("ignoring open event in state {:?}", self.connection);
            return;
        }
        tracing::info!("socket open");
        self.connection = ConnectionState::Open;
        self.state.log.append(CONNECTION_UP_LINE);
        self.redraw();
    }

    /// Explicit closes and transport errors both end up here.
    pub fn on_close(&mut self) {
        if self.connection == ConnectionState::Closed {
            return;
        }
        tracing::info!("socket close");
        self.connection = ConnectionState::Closed;
        self.sink = None;
        self.state.log.append(CONNECTION_LOST_LINE);
        self.redraw();
    }

    pub fn on_message(&mut self, raw: &str) -> Option<Dispatched> {
        if self.connection != ConnectionState::Open {
            tracing::warn!("dropping frame received while {:?}", self.connection);
            return None;
        }
        let outcome = self.dispatcher.on_message(raw, &mut self.state);
        if outcome.changed_state() {
            self.redraw();
        }
        Some(outcome)
    }

    /// Serialize and send `command`. While not open this only records the
    /// not-connected line.
    pub fn send(&mut self, command: &Command) -> ViewerResult<()> {
        if self.connection != ConnectionState::Open || self.sink.is_none() {
            self.state.log.append(NOT_CONNECTED_LINE);
            self.redraw();
            return Err(ViewerError::NotConnected);
        }
        let text = command.to_json().map_err(|e| ViewerError::Transport(e.to_string()))?;
        tracing::debug!("sending {}", text);
        let Some(sink) = self.sink.as_mut() else {
            return Err(ViewerError::NotConnected);
        };
        sink.send_text(text).inspect_err(|e| tracing::warn!("send failed: {}", e))
    }

    pub fn edit_threshold(
        &mut self,
        level: i64,
        prompt: &mut dyn OperatorPrompt,
    ) -> ViewerResult<EditOutcome> {
        let outcome = self.editor.request_edit(level, prompt, &mut self.state.thresholds)?;
        match &outcome {
            EditOutcome::Requested(command) => self.send(command)?,
            EditOutcome::Applied { .. } => self.redraw(),
            EditOutcome::Abandoned => {}
        }
        Ok(outcome)
    }

    pub fn toggle_mark(&mut self) {
        self.state.log.mark();
        self.redraw();
    }

    pub fn clear_log(&mut self) {
        self.state.log.clear();
        self.redraw();
    }

    pub fn change_level(&mut self, level: i64) -> ViewerResult<()> {
        let command = self.level_action.command(level);
        self.send(&command)
    }

    pub fn set_log_level(&mut self, namespace: &str, level: &str) -> ViewerResult<()> {
        self.send(&Command::SetLogLevel {
            namespace: namespace.to_string(),
            level: level.to_string(),
        })
    }

    /// Close the session and release the transport.
    pub fn dispose(mut self) -> ViewerState {
        self.on_close();
        self.state
    }

    fn redraw(&mut self) {
        self.surface.redraw(&self.state);
    }
}
