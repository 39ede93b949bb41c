//! Observer forwarding packager notifications into the async runtime

use pkgd_core::{InstallState, InstallationHandle, PackagerObserver};
use tokio::sync::mpsc::UnboundedSender;

/// Terminal notification of the activity the CLI started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Installation {
        state: InstallState,
        progress: u8,
        error_code: u32,
    },
    Synced {
        status: u32,
    },
}

pub struct CompletionObserver {
    tx: UnboundedSender<Completion>,
}

impl CompletionObserver {
    pub fn new(tx: UnboundedSender<Completion>) -> Self {
        Self { tx }
    }
}

impl PackagerObserver for CompletionObserver {
    fn on_state_change(&self, handle: &InstallationHandle) {
        let state = handle.state();
        if state.is_terminal() {
            let _ = self.tx.send(Completion::Installation {
                state,
                progress: handle.progress(),
                error_code: handle.error_code(),
            });
        }
    }

    fn on_repository_synced(&self, status: u32) {
        let _ = self.tx.send(Completion::Synced { status });
    }
}
