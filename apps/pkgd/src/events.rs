//! Event handling and progress display

use console::style;
use pkgd_events::{AppEvent, EventMessage, GeneralEvent, InstallEvent, RepoEvent};

use crate::logging::log_event_with_tracing;

/// Logs every event and shows progress lines on stderr
pub struct EventHandler {
    /// Suppress human-oriented output (JSON mode)
    quiet: bool,
}

impl EventHandler {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn handle_event(&mut self, message: &EventMessage) {
        log_event_with_tracing(message);
        if self.quiet {
            return;
        }

        match &message.event {
            AppEvent::Install(InstallEvent::Admitted {
                package,
                download_only,
                ..
            }) => {
                let verb = if *download_only {
                    "Downloading"
                } else {
                    "Installing"
                };
                self.show_status(&format!("{} {package}", style(verb).cyan().bold()));
            }
            AppEvent::Install(InstallEvent::StateChanged {
                state, progress, ..
            }) => {
                self.show_status(&format!("  {state:<12} {progress:>3}%"));
            }
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                self.show_status(&format!("{} {message}", style("warning:").yellow().bold()));
            }
            AppEvent::Repo(RepoEvent::SyncStarted { mode, .. }) => {
                self.show_status(&format!(
                    "{} repository ({mode})",
                    style("Refreshing").cyan().bold()
                ));
            }
            AppEvent::Repo(RepoEvent::SyncFailed { failure, .. })
            | AppEvent::Install(InstallEvent::Failed {
                failure: Some(failure),
                ..
            }) => {
                if let Some(hint) = &failure.hint {
                    self.show_status(&format!("{} {hint}", style("hint:").yellow()));
                }
            }
            _ => {}
        }
    }

    fn show_status(&self, line: &str) {
        eprintln!("{line}");
    }
}
