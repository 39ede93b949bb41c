use serde::{Deserialize, Serialize};

use super::FailureContext;
use pkgd_types::{InstallState, PackageDescriptor};

/// Installation activity events, one per observable state change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Activity admitted and handed to the worker
    Admitted {
        activity_id: u64,
        package: PackageDescriptor,
        download_only: bool,
    },

    /// Installation state or progress changed
    StateChanged {
        activity_id: u64,
        package: PackageDescriptor,
        state: InstallState,
        progress: u8,
    },

    /// Installation reached a successful terminal state
    Completed {
        activity_id: u64,
        package: PackageDescriptor,
        state: InstallState,
    },

    /// Installation reached a failed or aborted terminal state
    Failed {
        activity_id: u64,
        package: PackageDescriptor,
        state: InstallState,
        error_code: u32,
        failure: Option<FailureContext>,
    },
}

impl InstallEvent {
    #[must_use]
    pub fn activity_id(&self) -> u64 {
        match self {
            Self::Admitted { activity_id, .. }
            | Self::StateChanged { activity_id, .. }
            | Self::Completed { activity_id, .. }
            | Self::Failed { activity_id, .. } => *activity_id,
        }
    }
}
