//! Install worker: the dedicated thread that runs admitted activities

use std::sync::Mutex;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};
use pkgd_errors::{codes, toolchain_code, Error, ToolchainError};
use pkgd_events::{AppEvent, EventEmitter, FailureContext, RepoEvent};
use pkgd_toolchain::{ProgressControl, ProgressSink, ToolchainPhase, ToolchainProgress};
use pkgd_types::{InstallRequest, InstallState, RefreshMode};
use tracing::{debug, error, info, warn};

use crate::hub::SyncReport;
use crate::packager::Shared;
use crate::slot::SlotEntry;
use crate::InstallationHandle;

/// Name of the worker thread, visible in debuggers and panic messages
pub const WORKER_THREAD_NAME: &str = "pkgd-install-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerSignal {
    /// The slot holds a new activity
    Wake,
    Shutdown,
}

#[derive(Debug)]
pub(crate) struct Worker {
    signals: Sender<WorkerSignal>,
    thread_id: ThreadId,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    pub(crate) fn spawn(shared: std::sync::Arc<Shared>) -> Result<Self, Error> {
        let (signals, receiver) = channel::unbounded();
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run(&shared, &receiver))
            .map_err(|e| Error::internal(format!("failed to spawn install worker: {e}")))?;
        Ok(Self {
            signals,
            thread_id: thread.thread().id(),
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Release the worker to run the activity in the slot
    pub(crate) fn wake(&self) -> Result<(), Error> {
        self.signals
            .send(WorkerSignal::Wake)
            .map_err(|_| Error::Unavailable)
    }

    pub(crate) fn is_current_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stop the worker after the activity it is running, then join it
    pub(crate) fn shutdown(&self) {
        // Fails only when the thread is already gone.
        let _ = self.signals.send(WorkerSignal::Shutdown);

        let thread = self
            .thread
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        let Some(thread) = thread else {
            return;
        };
        if self.is_current_thread() {
            debug!("install worker shutting down from its own thread");
            return;
        }
        if thread.join().is_err() {
            error!("install worker terminated abnormally");
        }
    }
}

fn run(shared: &Shared, receiver: &Receiver<WorkerSignal>) {
    debug!("install worker started");
    while let Ok(signal) = receiver.recv() {
        match signal {
            WorkerSignal::Wake => process(shared),
            WorkerSignal::Shutdown => break,
        }
    }
    debug!("install worker stopped");
}

/// What the worker copies out of the admin state before running
struct Job {
    entry: SlotEntry,
    always_update_first: bool,
    no_deps: bool,
}

fn process(shared: &Shared) {
    let job = {
        let admin = shared.admin();
        let Some(entry) = admin.slot.entry().cloned() else {
            debug!("install worker woken with an empty slot");
            return;
        };
        let config = admin.config.as_ref();
        Job {
            entry,
            always_update_first: config.is_some_and(|c| c.always_update_first),
            no_deps: config.is_some_and(|c| c.no_deps),
        }
    };

    match &job.entry {
        SlotEntry::Package(handle) => run_install(shared, handle, &job),
        SlotEntry::RepoSync { activity_id } => run_sync(shared, *activity_id),
    }

    let activity_id = job.entry.activity_id();
    if shared.admin().slot.clear(activity_id) {
        debug!(activity_id, "activity slot cleared");
    } else {
        warn!(activity_id, "activity slot no longer held the finished activity");
    }
}

fn run_install(shared: &Shared, handle: &InstallationHandle, job: &Job) {
    let descriptor = handle.descriptor();
    let mode = if job.always_update_first {
        RefreshMode::Forced
    } else {
        RefreshMode::Setup
    };
    info!(
        package = %handle.package(),
        download_only = handle.is_download_only(),
        %mode,
        "installation started"
    );

    let result = if descriptor.is_abort_requested() {
        Err(ToolchainError::Aborted)
    } else {
        let mut store = shared.store();
        store
            .refresh(mode)
            .inspect_err(|e| error!(%mode, error = %e, "repository refresh before install failed"))
            .and_then(|()| {
                let request = InstallRequest::new(handle.package().clone())
                    .with_download_only(handle.is_download_only())
                    .with_no_deps(job.no_deps);
                let mut sink = DescriptorSink { shared, handle };
                store.install(&request, &mut sink)
            })
    };

    let (terminal, code, failure) = match result {
        Ok(outcome) => (InstallState::from(outcome), codes::NONE, None),
        Err(err) => {
            let aborted =
                matches!(err, ToolchainError::Aborted) || descriptor.is_abort_requested();
            let (terminal, code) = if aborted {
                (InstallState::Aborted, codes::ABORTED)
            } else {
                (InstallState::Failed, toolchain_code(&err))
            };
            error!(
                package = %handle.package(),
                code,
                error = %err,
                "installation failed"
            );
            (terminal, code, Some(FailureContext::from_error(code, &err)))
        }
    };

    if descriptor.finish(terminal, code) {
        info!(package = %handle.package(), state = %terminal, code, "installation finished");
        shared
            .hub
            .state_changed(&shared.observers(), handle, failure);
    }
}

fn run_sync(shared: &Shared, activity_id: u64) {
    let mode = RefreshMode::Forced;
    let started = Instant::now();
    info!(activity_id, "repository sync started");
    shared.hub.emit_for_activity(
        activity_id,
        AppEvent::Repo(RepoEvent::SyncStarted { activity_id, mode }),
    );

    let result = shared.store().refresh_forced();
    let (status, failure) = match result {
        Ok(()) => {
            info!(activity_id, "repository sync finished");
            (codes::NONE, None)
        }
        Err(err) => {
            let status = toolchain_code(&err);
            error!(activity_id, code = status, error = %err, "repository sync failed");
            (status, Some(FailureContext::from_error(status, &err)))
        }
    };

    shared.hub.repository_synced(
        &shared.observers(),
        SyncReport {
            activity_id,
            mode,
            status,
            duration: started.elapsed(),
            failure,
        },
    );
}

/// Maps toolchain progress onto the installation descriptor
struct DescriptorSink<'a> {
    shared: &'a Shared,
    handle: &'a InstallationHandle,
}

impl ProgressSink for DescriptorSink<'_> {
    fn report(&mut self, progress: ToolchainProgress) -> ProgressControl {
        let descriptor = self.handle.descriptor();
        if descriptor.is_abort_requested() {
            return ProgressControl::Abort;
        }

        let state = match progress.phase {
            ToolchainPhase::Downloading => InstallState::Downloading,
            ToolchainPhase::Installing => InstallState::Installing,
        };
        if let Some(previous) = descriptor.advance(state, progress.percent) {
            if previous != state {
                self.shared
                    .hub
                    .state_changed(&self.shared.observers(), self.handle, None);
            }
        }
        ProgressControl::Continue
    }

    fn should_abort(&self) -> bool {
        self.handle.descriptor().is_abort_requested()
    }
}
