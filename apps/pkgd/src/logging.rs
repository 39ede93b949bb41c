//! Structured logging integration for events
//!
//! Converts each [`EventMessage`] into a tracing record with structured
//! fields so JSON log consumers can follow an activity by its correlation id.

use pkgd_events::{AppEvent, EventMessage, GeneralEvent, InstallEvent, RepoEvent};
use tracing::{debug, error, info, warn};

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let target = message.event.log_target();

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    event_target = target,
                    context = ?context,
                    "{message}"
                );
            }
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    event_target = target,
                    details = ?details,
                    "{message}"
                );
            }
            GeneralEvent::Configured {
                config_file,
                feeds,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    config_file = %config_file,
                    feeds = feeds,
                    "Packager configured"
                );
            }
            GeneralEvent::ShutdownCompleted { cache_wiped } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    cache_wiped = cache_wiped,
                    "Packager shut down"
                );
            }
        },

        AppEvent::Install(event) => match event {
            InstallEvent::Admitted {
                package,
                download_only,
                ..
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    download_only = download_only,
                    "Installation admitted"
                );
            }
            InstallEvent::StateChanged {
                package,
                state,
                progress,
                ..
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    state = %state,
                    progress = progress,
                    "Installation state changed"
                );
            }
            InstallEvent::Completed { package, state, .. } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    state = %state,
                    "Installation completed"
                );
            }
            InstallEvent::Failed {
                package,
                state,
                error_code,
                failure,
                ..
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    package = %package,
                    state = %state,
                    error_code = error_code,
                    code = ?failure.as_ref().and_then(|f| f.code.as_deref()),
                    message = ?failure.as_ref().map(|f| f.message.as_str()),
                    hint = ?failure.as_ref().and_then(|f| f.hint.as_deref()),
                    "Installation failed"
                );
            }
        },

        AppEvent::Repo(event) => match event {
            RepoEvent::SyncStarted { mode, .. } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    mode = %mode,
                    "Repository sync started"
                );
            }
            RepoEvent::SyncCompleted {
                mode,
                status,
                duration_ms,
                ..
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    mode = %mode,
                    status = status,
                    duration_ms = duration_ms,
                    "Repository sync completed"
                );
            }
            RepoEvent::SyncFailed {
                mode,
                status,
                failure,
                ..
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    mode = %mode,
                    status = status,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Repository sync failed"
                );
            }
        },
    }
}
