#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the pkgd package-installation manager
//!
//! Errors are organised by domain. Every error can be reduced to a numeric
//! status code (see [`codes`]) for hosts that only forward plain codes.

use std::borrow::Cow;

use thiserror::Error;

pub mod codes;
pub mod config;
pub mod toolchain;

pub use config::ConfigError;
pub use toolchain::ToolchainError;

/// Error returned by the packager's public operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("another activity is already in progress")]
    InProgress,

    #[error("packager is not configured")]
    NotConfigured,

    #[error("cannot reconfigure while an activity is in progress")]
    AlreadyConfigured,

    #[error("toolchain failed to initialize: {message}")]
    ToolchainInitFailed { message: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    #[error("operation unavailable in the current state")]
    Unavailable,

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("observer is already registered")]
    ObserverAlreadyRegistered,

    #[error("observer is not registered")]
    ObserverNotRegistered,

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an invalid request error with a message
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    /// Numeric status code for this error
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::InProgress => codes::IN_PROGRESS,
            Self::NotConfigured => codes::NOT_CONFIGURED,
            Self::AlreadyConfigured => codes::ALREADY_CONFIGURED,
            Self::ToolchainInitFailed { .. } => codes::TOOLCHAIN_INIT_FAILED,
            Self::Config(_) => codes::CONFIG,
            Self::Toolchain(err) => toolchain_code(err),
            Self::Unavailable => codes::UNAVAILABLE,
            Self::InvalidRequest { .. } => codes::INVALID_REQUEST,
            Self::ObserverAlreadyRegistered | Self::ObserverNotRegistered => {
                codes::PROTOCOL_MISUSE
            }
            Self::Internal(_) => codes::GENERAL,
        }
    }

    /// Whether the error is an admission rejection the caller may retry later
    #[must_use]
    pub fn is_admission(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Whether the error reports a misuse of the observer protocol
    #[must_use]
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(
            self,
            Self::ObserverAlreadyRegistered | Self::ObserverNotRegistered
        )
    }
}

/// Status code recorded for a toolchain failure
#[must_use]
pub fn toolchain_code(err: &ToolchainError) -> u32 {
    match err {
        ToolchainError::Aborted => codes::ABORTED,
        ToolchainError::InitFailed { .. } => codes::TOOLCHAIN_INIT_FAILED,
        ToolchainError::NotConfigured => codes::NOT_CONFIGURED,
        _ => codes::TOOLCHAIN,
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

/// Result type alias for pkgd operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Config(err) => err.user_message(),
            Error::Toolchain(err) => err.user_message(),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::InProgress => Some("Wait for the current activity to finish and retry."),
            Error::NotConfigured => Some("Run configure with a valid configuration first."),
            Error::AlreadyConfigured => {
                Some("Reconfigure once the current activity has completed.")
            }
            Error::Config(err) => err.user_hint(),
            Error::Toolchain(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::InProgress | Error::AlreadyConfigured => true,
            Error::Toolchain(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::InProgress => Some("packager.in_progress"),
            Error::NotConfigured => Some("packager.not_configured"),
            Error::AlreadyConfigured => Some("packager.already_configured"),
            Error::ToolchainInitFailed { .. } => Some("packager.toolchain_init_failed"),
            Error::Config(err) => err.user_code(),
            Error::Toolchain(err) => err.user_code(),
            Error::Unavailable => Some("packager.unavailable"),
            Error::InvalidRequest { .. } => Some("packager.invalid_request"),
            Error::ObserverAlreadyRegistered => Some("packager.observer_already_registered"),
            Error::ObserverNotRegistered => Some("packager.observer_not_registered"),
            Error::Internal(_) => Some("error.internal"),
        }
    }
}
