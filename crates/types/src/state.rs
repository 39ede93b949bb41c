//! Installation state and activity type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one installation activity
///
/// States are ordered by [`InstallState::rank`]. An installation only ever
/// moves to a state of equal or higher rank and ends in exactly one terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum InstallState {
    Idle = 0,
    Downloading = 1,
    Installing = 2,
    Installed = 3,
    Upgraded = 4,
    /// Download-only activity finished with the package in the cache
    Downloaded = 5,
    Failed = 6,
    Aborted = 7,
}

impl InstallState {
    /// Decode the value stored in an atomic cell
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Idle,
            1 => Self::Downloading,
            2 => Self::Installing,
            3 => Self::Installed,
            4 => Self::Upgraded,
            5 => Self::Downloaded,
            6 => Self::Failed,
            7 => Self::Aborted,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Position in the lifecycle; all terminal states share the top rank
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Downloading => 1,
            Self::Installing => 2,
            Self::Installed | Self::Upgraded | Self::Downloaded | Self::Failed | Self::Aborted => {
                3
            }
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Installed | Self::Upgraded | Self::Downloaded)
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic
    ///
    /// Same-state writes are allowed for non-terminal states (progress updates
    /// within a phase); a terminal state accepts nothing.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Upgraded => "upgraded",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

impl Default for InstallState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of activity currently owned by the packager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    None,
    Install,
    Download,
    RepoSync,
}

impl ActivityKind {
    /// Whether the activity carries a package and installation descriptor
    #[must_use]
    pub fn has_package(self) -> bool {
        matches!(self, Self::Install | Self::Download)
    }

    #[must_use]
    pub fn is_idle(self) -> bool {
        self == Self::None
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Install => "install",
            Self::Download => "download",
            Self::RepoSync => "repo_sync",
        }
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How thoroughly the local repository metadata is refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Minimal refresh, enough to resolve a requested package
    Setup,
    /// Always re-fetch every remote index
    Forced,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => f.write_str("setup"),
            Self::Forced => f.write_str("forced"),
        }
    }
}

/// Successful result reported by the toolchain for an install request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    Installed,
    Upgraded,
    Downloaded,
}

impl From<InstallOutcome> for InstallState {
    fn from(outcome: InstallOutcome) -> Self {
        match outcome {
            InstallOutcome::Installed => Self::Installed,
            InstallOutcome::Upgraded => Self::Upgraded,
            InstallOutcome::Downloaded => Self::Downloaded,
        }
    }
}
