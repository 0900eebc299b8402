// Terminal rendering surface
use crate::application::dispatcher::ViewerState;
use crate::application::session::RenderSurface;
use crate::domain::sample::Sample;
use crate::domain::series_buffer::axis_range;
use crate::domain::threshold::ThresholdStore;
use chrono::DateTime;
use std::io::Write;

/// Prints new log lines as they appear, plus one status line per new sample
/// or threshold change.
pub struct TerminalSurface<W: Write> {
    out: W,
    next_log_seq: u64,
    shown_status: Option<String>,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            next_log_seq: 0,
            shown_status: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, state: &ViewerState) -> std::io::Result<()> {
        for line in state.log.lines_since(self.next_log_seq) {
            writeln!(self.out, "{}", line)?;
        }
        self.next_log_seq = state.log.next_seq();

        if let Some(latest) = state.series.latest() {
            let status = status_line(latest, &state.thresholds, state.series.value_bounds());
            if self.shown_status.as_deref() != Some(status.as_str()) {
                writeln!(self.out, "{}", status)?;
                self.shown_status = Some(status);
            }
        }
        self.out.flush()
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn redraw(&mut self, state: &ViewerState) {
        if let Err(e) = self.render(state) {
            tracing::error!("terminal redraw failed: {}", e);
        }
    }
}

fn status_line(latest: &Sample, thresholds: &ThresholdStore, bounds: Option<(f64, f64)>) -> String {
    let time = DateTime::from_timestamp_millis(latest.time_ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| latest.time_ms.to_string());
    let values: Vec<String> = latest
        .values
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    let levels: Vec<String> = thresholds
        .thresholds()
        .iter()
        .map(|t| match t.value {
            Some(v) => format!("L{}={}", t.level.get(), v),
            None => format!("L{}=-", t.level.get()),
        })
        .collect();
    let axis = match axis_range(bounds, &thresholds.set_values()) {
        Some((lo, hi)) => format!("[{} .. {}]", lo, hi),
        None => "[]".to_string(),
    };
    format!("{} {} | {} | axis {}", time, values.join(" "), levels.join(" "), axis)
}
