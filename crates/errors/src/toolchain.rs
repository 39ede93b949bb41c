//! Errors surfaced by the external package-management toolchain

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ToolchainError {
    #[error("toolchain initialization failed: {message}")]
    InitFailed { message: String },

    #[error("toolchain is not configured")]
    NotConfigured,

    #[error("repository refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("package not found: {package}")]
    PackageNotFound { package: String },

    #[error("signature check failed for {package}")]
    SignatureCheckFailed { package: String },

    #[error("dependency resolution failed: {message}")]
    DependencyFailed { message: String },

    #[error("download failed: {message}")]
    DownloadFailed { message: String },

    #[error("command `{command}` failed with status {status}: {message}")]
    CommandFailed {
        command: String,
        status: i32,
        message: String,
    },

    #[error("toolchain operation aborted")]
    Aborted,

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for ToolchainError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl UserFacingError for ToolchainError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotConfigured => Some("Configure the packager before running operations."),
            Self::RefreshFailed { .. } | Self::DownloadFailed { .. } => {
                Some("Check network connectivity and the configured feeds, then retry.")
            }
            Self::SignatureCheckFailed { .. } => Some(
                "Verify the feed signing keys or disable signature checks for trusted feeds.",
            ),
            Self::PackageNotFound { .. } => {
                Some("Synchronize the repository and check the package name and architecture.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailed { .. } | Self::DownloadFailed { .. } | Self::Io { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InitFailed { .. } => "toolchain.init_failed",
            Self::NotConfigured => "toolchain.not_configured",
            Self::RefreshFailed { .. } => "toolchain.refresh_failed",
            Self::PackageNotFound { .. } => "toolchain.package_not_found",
            Self::SignatureCheckFailed { .. } => "toolchain.signature_check_failed",
            Self::DependencyFailed { .. } => "toolchain.dependency_failed",
            Self::DownloadFailed { .. } => "toolchain.download_failed",
            Self::CommandFailed { .. } => "toolchain.command_failed",
            Self::Aborted => "toolchain.aborted",
            Self::Io { .. } => "toolchain.io",
        })
    }
}
