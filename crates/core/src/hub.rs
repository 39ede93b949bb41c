//! Observer registry and notification fan-out

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use pkgd_errors::{codes, Error};
use pkgd_events::{
    AppEvent, EventEmitter, EventSender, FailureContext, InstallEvent, RepoEvent,
};
use pkgd_types::RefreshMode;
use tracing::{debug, error, warn};

use crate::InstallationHandle;

/// Receiver of packager notifications
///
/// Callbacks run synchronously on the install worker thread, so they must
/// return promptly. Calling [`crate::Packager::unregister`] from inside a
/// callback is allowed.
pub trait PackagerObserver: Send + Sync {
    /// Called on every installation state change
    fn on_state_change(&self, handle: &InstallationHandle);

    /// Called when a bare repository sync finished; `status` is 0 on success
    fn on_repository_synced(&self, status: u32);
}

/// Registered observers, compared by identity
#[derive(Default)]
pub(crate) struct ObserverSet {
    observers: Vec<Arc<dyn PackagerObserver>>,
}

impl ObserverSet {
    fn position(&self, observer: &Arc<dyn PackagerObserver>) -> Option<usize> {
        self.observers.iter().position(|o| Arc::ptr_eq(o, observer))
    }

    pub(crate) fn register(&mut self, observer: Arc<dyn PackagerObserver>) -> Result<(), Error> {
        if self.position(&observer).is_some() {
            warn!("observer registered twice");
            return Err(Error::ObserverAlreadyRegistered);
        }
        self.observers.push(observer);
        Ok(())
    }

    pub(crate) fn unregister(&mut self, observer: &Arc<dyn PackagerObserver>) -> Result<(), Error> {
        let Some(index) = self.position(observer) else {
            warn!("unregister of unknown observer");
            return Err(Error::ObserverNotRegistered);
        };
        self.observers.remove(index);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn PackagerObserver>> {
        self.observers.clone()
    }
}

/// Outcome of one repository sync, as delivered to observers and events
#[derive(Debug, Clone)]
pub(crate) struct SyncReport {
    pub activity_id: u64,
    pub mode: RefreshMode,
    pub status: u32,
    pub duration: Duration,
    pub failure: Option<FailureContext>,
}

/// Delivers notifications to observers and mirrors them onto the event stream
#[derive(Debug, Default)]
pub(crate) struct NotificationHub {
    events: OnceLock<EventSender>,
}

impl EventEmitter for NotificationHub {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.get()
    }
}

impl NotificationHub {
    /// Attach the event stream; only the first sender is kept
    pub(crate) fn attach(&self, sender: EventSender) -> bool {
        self.events.set(sender).is_ok()
    }

    pub(crate) fn state_changed(
        &self,
        observers: &[Arc<dyn PackagerObserver>],
        handle: &InstallationHandle,
        failure: Option<FailureContext>,
    ) {
        let state = handle.state();
        debug!(
            package = %handle.package(),
            state = %state,
            progress = handle.progress(),
            observers = observers.len(),
            "notifying state change"
        );

        for observer in observers {
            self.deliver("on_state_change", || observer.on_state_change(handle));
        }

        let activity_id = handle.activity_id();
        let package = handle.package().clone();
        let event = if state.is_success() {
            InstallEvent::Completed {
                activity_id,
                package,
                state,
            }
        } else if state.is_terminal() {
            InstallEvent::Failed {
                activity_id,
                package,
                state,
                error_code: handle.error_code(),
                failure,
            }
        } else {
            InstallEvent::StateChanged {
                activity_id,
                package,
                state,
                progress: handle.progress(),
            }
        };
        self.emit_for_activity(activity_id, AppEvent::Install(event));
    }

    pub(crate) fn repository_synced(
        &self,
        observers: &[Arc<dyn PackagerObserver>],
        report: SyncReport,
    ) {
        debug!(
            status = report.status,
            observers = observers.len(),
            "notifying repository sync"
        );

        for observer in observers {
            self.deliver("on_repository_synced", || {
                observer.on_repository_synced(report.status);
            });
        }

        let event = match report.failure {
            Some(failure) if report.status != codes::NONE => RepoEvent::SyncFailed {
                activity_id: report.activity_id,
                mode: report.mode,
                status: report.status,
                failure,
            },
            _ => RepoEvent::SyncCompleted {
                activity_id: report.activity_id,
                mode: report.mode,
                status: report.status,
                duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            },
        };
        self.emit_for_activity(report.activity_id, AppEvent::Repo(event));
    }

    /// Run one observer callback, containing a panic inside it
    fn deliver(&self, callback: &'static str, f: impl FnOnce()) {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(callback, panic = %message, "observer panicked");
            self.emit_error_with_details(format!("observer panicked in {callback}"), message);
        }
    }
}
