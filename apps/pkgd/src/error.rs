//! CLI error handling

use std::fmt;

use pkgd_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Error returned by configuration loading or a packager operation
    Packager(pkgd_errors::Error),
    /// The activity ran but ended in a failure state
    ActivityFailed {
        activity: String,
        code: u32,
        message: Option<String>,
    },
    /// The worker went away before reporting completion
    Interrupted,
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            CliError::Packager(e) => e.code(),
            CliError::ActivityFailed { code, .. } => *code,
            CliError::Interrupted | CliError::Io(_) => pkgd_errors::codes::GENERAL,
        };
        i32::try_from(code).unwrap_or(1).max(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Packager(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::ActivityFailed {
                activity,
                code,
                message,
            } => {
                write!(
                    f,
                    "{activity} failed with status {code} ({})",
                    pkgd_errors::codes::name(*code)
                )?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            CliError::Interrupted => write!(f, "packager stopped before the activity finished"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Packager(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<pkgd_errors::Error> for CliError {
    fn from(e: pkgd_errors::Error) -> Self {
        CliError::Packager(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
