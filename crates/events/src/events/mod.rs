use serde::{Deserialize, Serialize};

use crate::EventSource;
use pkgd_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable status code from `pkgd_errors::codes`.
    pub status: u32,
    /// Dotted error identifier, e.g. `toolchain.refresh_failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(status: u32, error: &E) -> Self {
        Self {
            status,
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod general;
pub mod install;
pub mod repo;

pub use general::*;
pub use install::*;
pub use repo::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, lifecycle of the packager)
    General(GeneralEvent),

    /// Installation activity events
    Install(InstallEvent),

    /// Repository refresh events
    Repo(RepoEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Install(_) => EventSource::INSTALL,
            Self::Repo(_) => EventSource::REPO,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Install(InstallEvent::Failed { .. })
            | Self::Repo(RepoEvent::SyncFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            Self::Install(InstallEvent::StateChanged { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "pkgd::events::general",
            Self::Install(_) => "pkgd::events::install",
            Self::Repo(_) => "pkgd::events::repo",
        }
    }
}
