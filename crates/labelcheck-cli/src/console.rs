//! Terminal progress output.

use labelcheck_workflow::{ProgressEvent, ProgressSink};

/// Writes progress events to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Line printed for `event`, if any.
    fn line(event: &ProgressEvent) -> Option<String> {
        match event {
            ProgressEvent::Finished => None,
            ProgressEvent::StageStarted { .. } => Some(event.to_string()),
            _ => Some(format!("✔ {}", event)),
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }
        if let Some(line) = Self::line(&event) {
            eprintln!("{}", line);
        }
    }
}
