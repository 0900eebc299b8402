// Main entry point - wiring of config, transport, session and terminal
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::LinesStream;
use tracing_subscriber::EnvFilter;

use telemetry_viewer::application::session::{RenderSurface, SessionController};
use telemetry_viewer::domain::error::ViewerError;
use telemetry_viewer::infrastructure::config::load_viewer_config;
use telemetry_viewer::infrastructure::websocket::{spawn_connection, ConnectionEvent};
use telemetry_viewer::presentation::operator::{parse_operator_line, OperatorEvent, PresetResponse};
use telemetry_viewer::presentation::terminal::TerminalSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_viewer_config()?;
    let settings = config.session_settings()?;

    let (event_tx, mut event_rx) = mpsc::channel(100);
    let sink = spawn_connection(config.url.clone(), event_tx);
    let mut session = SessionController::init(settings, Box::new(sink), TerminalSurface::stdout());

    let mut operator = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let mut events_open = true;
    let mut operator_open = true;

    // One reaction at a time: each event runs to completion before the next.
    while events_open || operator_open {
        tokio::select! {
            event = event_rx.recv(), if events_open => match event {
                Some(ConnectionEvent::Opened) => session.on_open(),
                Some(ConnectionEvent::Frame(text)) => {
                    session.on_message(&text);
                }
                Some(ConnectionEvent::Closed) | None => {
                    session.on_close();
                    events_open = false;
                }
            },
            line = operator.next(), if operator_open => match line {
                Some(Ok(line)) => match parse_operator_line(&line) {
                    Ok(OperatorEvent::Quit) => break,
                    Ok(event) => handle_operator_event(&mut session, event),
                    Err(e) => tracing::warn!("{}", e),
                },
                Some(Err(e)) => {
                    tracing::warn!("operator input failed: {}", e);
                    operator_open = false;
                }
                None => operator_open = false,
            },
        }
    }

    session.dispose();
    Ok(())
}

fn handle_operator_event<S: RenderSurface>(session: &mut SessionController<S>, event: OperatorEvent) {
    let result = match event {
        OperatorEvent::EditThreshold { level, response } => session
            .edit_threshold(level, &mut PresetResponse(response))
            .map(|_| ()),
        OperatorEvent::ToggleMark => {
            session.toggle_mark();
            Ok(())
        }
        OperatorEvent::ClearLog => {
            session.clear_log();
            Ok(())
        }
        OperatorEvent::ChangeLevel(level) => session.change_level(level),
        OperatorEvent::SetLogLevel { namespace, level } => session.set_log_level(&namespace, &level),
        OperatorEvent::Quit => Ok(()),
    };
    match result {
        Ok(()) => {}
        Err(ViewerError::NotConnected) => tracing::debug!("operator action dropped: not connected"),
        Err(e) => tracing::warn!("operator action failed: {}", e),
    }
}
