use serde::{Deserialize, Serialize};

use super::FailureContext;
use pkgd_types::RefreshMode;

/// Repository refresh events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RepoEvent {
    /// Refresh of the local metadata started
    SyncStarted { activity_id: u64, mode: RefreshMode },

    /// Refresh finished; `status` is zero on success
    SyncCompleted {
        activity_id: u64,
        mode: RefreshMode,
        status: u32,
        duration_ms: u64,
    },

    /// Refresh failed
    SyncFailed {
        activity_id: u64,
        mode: RefreshMode,
        status: u32,
        failure: FailureContext,
    },
}
