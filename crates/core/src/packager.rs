//! Public entry points: admission, configuration and observer registration

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pkgd_config::PackagerConfig;
use pkgd_errors::Error;
use pkgd_events::{AppEvent, EventEmitter, EventSender, GeneralEvent, InstallEvent};
use pkgd_toolchain::{RepositoryStore, Toolchain};
use pkgd_types::{ActivityKind, PackageDescriptor};
use tracing::{debug, error, info, warn};

use crate::hub::{NotificationHub, ObserverSet};
use crate::slot::ActivitySlot;
use crate::worker::Worker;
use crate::{InstallationHandle, PackagerObserver};

/// State guarded by the admin lock
#[derive(Default)]
pub(crate) struct AdminState {
    pub(crate) slot: ActivitySlot,
    /// Present once `configure` succeeded
    pub(crate) config: Option<PackagerConfig>,
    pub(crate) observers: ObserverSet,
    pub(crate) shut_down: bool,
}

/// State shared between the packager and its worker thread
///
/// Lock order: `admin` before `store`. The worker takes `admin` while holding
/// `store` only for short snapshots, which cannot deadlock because `configure`
/// reaches `store` only while the slot is empty.
pub(crate) struct Shared {
    admin: Mutex<AdminState>,
    store: Mutex<RepositoryStore>,
    pub(crate) hub: NotificationHub,
}

impl Shared {
    pub(crate) fn admin(&self) -> MutexGuard<'_, AdminState> {
        self.admin.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn store(&self) -> MutexGuard<'_, RepositoryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn observers(&self) -> Vec<Arc<dyn PackagerObserver>> {
        self.admin().observers.snapshot()
    }
}

/// Asynchronous package-installation manager
///
/// Admits at most one activity (install, download or repository sync) at a
/// time and runs it on a dedicated worker thread. Every operation returns
/// without waiting for the toolchain; progress is observed through the
/// returned [`InstallationHandle`] or a registered [`PackagerObserver`].
///
/// The packager is `Send + Sync`; share it through an `Arc`. Dropping it
/// stops the worker after the current activity and wipes a volatile cache.
pub struct Packager {
    shared: Arc<Shared>,
    worker: Worker,
}

impl std::fmt::Debug for Packager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packager")
            .field("activity", &self.activity())
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

impl Packager {
    /// Create a packager over `toolchain` and start its worker thread
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn new(toolchain: impl Toolchain + 'static) -> Result<Self, Error> {
        let shared = Arc::new(Shared {
            admin: Mutex::new(AdminState::default()),
            store: Mutex::new(RepositoryStore::new(toolchain)),
            hub: NotificationHub::default(),
        });
        let worker = Worker::spawn(Arc::clone(&shared))?;
        debug!("packager created");
        Ok(Self { shared, worker })
    }

    /// Mirror every notification onto `sender` as structured events
    #[must_use]
    pub fn with_events(self, sender: EventSender) -> Self {
        if !self.shared.hub.attach(sender) {
            warn!("event sender already attached, keeping the first one");
        }
        self
    }

    /// Apply a configuration and (re)initialise the toolchain
    ///
    /// Holds the admin lock for the whole call, so it never interleaves with
    /// admission. A failed call leaves the packager unconfigured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyConfigured`] while an activity is in progress,
    /// [`Error::Config`] for invalid settings or unwritable paths and
    /// [`Error::ToolchainInitFailed`] when the toolchain refuses.
    pub fn configure(&self, config: PackagerConfig) -> Result<(), Error> {
        let mut admin = self.shared.admin();
        if admin.shut_down {
            return Err(Error::Unavailable);
        }
        if !admin.slot.kind().is_idle() {
            warn!(activity = %admin.slot.kind(), "configure rejected while busy");
            return Err(Error::AlreadyConfigured);
        }

        admin.config = None;
        self.shared
            .store()
            .configure(&config)
            .inspect_err(|e| error!(error = %e, code = e.code(), "configure failed"))?;

        self.shared.hub.emit(AppEvent::General(GeneralEvent::Configured {
            config_file: config.toolchain_config_path().display().to_string(),
            feeds: config.feeds.len(),
        }));
        info!(
            verbosity = config.verbosity,
            no_deps = config.no_deps,
            no_signature_check = config.no_signature_check,
            always_update_first = config.always_update_first,
            "packager configured"
        );
        admin.config = Some(config);
        Ok(())
    }

    fn check_admission(&self, admin: &AdminState, requested: ActivityKind) -> Result<(), Error> {
        if admin.shut_down {
            return Err(Error::Unavailable);
        }
        if admin.config.is_none() {
            return Err(Error::NotConfigured);
        }
        let current = admin.slot.kind();
        if !current.is_idle() {
            warn!(activity = %current, %requested, "admission rejected");
            self.shared.hub.emit_warning(format!(
                "{requested} rejected while {current} is in progress"
            ));
            return Err(Error::InProgress);
        }
        Ok(())
    }

    /// Admit an install (or download-only) activity and return immediately
    ///
    /// Empty `version` and `architecture` leave the choice to the toolchain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an empty name,
    /// [`Error::NotConfigured`] before a successful [`Packager::configure`]
    /// and [`Error::InProgress`] while another activity runs.
    pub fn install(
        &self,
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
        download_only: bool,
    ) -> Result<InstallationHandle, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_request("package name must not be empty"));
        }
        let package = PackageDescriptor::new(name, version, architecture);

        let requested = if download_only {
            ActivityKind::Download
        } else {
            ActivityKind::Install
        };
        let mut admin = self.shared.admin();
        self.check_admission(&admin, requested)?;
        let handle = admin.slot.admit_package(package, download_only)?;

        info!(
            activity_id = handle.activity_id(),
            package = %handle.package(),
            download_only,
            "installation admitted"
        );
        // Emitted before the worker runs so it precedes every state event.
        self.shared.hub.emit_for_activity(
            handle.activity_id(),
            AppEvent::Install(InstallEvent::Admitted {
                activity_id: handle.activity_id(),
                package: handle.package().clone(),
                download_only,
            }),
        );
        if let Err(e) = self.worker.wake() {
            admin.slot.clear(handle.activity_id());
            return Err(e);
        }
        drop(admin);
        Ok(handle)
    }

    /// Admit a forced repository refresh and return immediately
    ///
    /// Completion is reported through
    /// [`PackagerObserver::on_repository_synced`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] before a successful
    /// [`Packager::configure`] and [`Error::InProgress`] while another
    /// activity runs.
    pub fn synchronize_repository(&self) -> Result<(), Error> {
        let activity_id = {
            let mut admin = self.shared.admin();
            self.check_admission(&admin, ActivityKind::RepoSync)?;
            let activity_id = admin.slot.admit_sync()?;
            if let Err(e) = self.worker.wake() {
                admin.slot.clear(activity_id);
                return Err(e);
            }
            activity_id
        };
        info!(activity_id, "repository sync admitted");
        Ok(())
    }

    /// Add an observer
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObserverAlreadyRegistered`] if this exact observer is
    /// already registered; the set is left unchanged.
    pub fn register(&self, observer: Arc<dyn PackagerObserver>) -> Result<(), Error> {
        let mut admin = self.shared.admin();
        admin.observers.register(observer)?;
        debug!(observers = admin.observers.len(), "observer registered");
        Ok(())
    }

    /// Remove an observer; takes effect from the next notification
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObserverNotRegistered`] if the observer is unknown.
    pub fn unregister(&self, observer: &Arc<dyn PackagerObserver>) -> Result<(), Error> {
        let mut admin = self.shared.admin();
        admin.observers.unregister(observer)?;
        debug!(observers = admin.observers.len(), "observer unregistered");
        Ok(())
    }

    #[must_use]
    pub fn activity(&self) -> ActivityKind {
        self.shared.admin().slot.kind()
    }

    /// Handle of the running install or download, if any
    #[must_use]
    pub fn current_installation(&self) -> Option<InstallationHandle> {
        self.shared.admin().slot.handle().cloned()
    }

    /// Whether `handle` still refers to the activity in the slot
    #[must_use]
    pub fn is_current(&self, handle: &InstallationHandle) -> bool {
        self.shared
            .admin()
            .slot
            .handle()
            .is_some_and(|h| h.same_activity(handle))
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.shared.admin().config.is_some()
    }

    /// Stop accepting work, abort and finish the current activity, stop the
    /// worker and wipe a volatile cache
    ///
    /// Idempotent. Called automatically on drop.
    pub fn shutdown(&self) {
        let current = {
            let mut admin = self.shared.admin();
            if admin.shut_down {
                return;
            }
            admin.shut_down = true;
            admin.slot.handle().cloned()
        };
        if let Some(handle) = current {
            // Already terminal or aborting is fine here.
            let _ = handle.abort();
        }

        self.worker.shutdown();
        if self.worker.is_current_thread() {
            warn!("packager dropped from an observer callback, cache left in place");
            return;
        }

        let cache_wiped = match self.shared.store().wipe_volatile_cache() {
            Ok(wiped) => wiped,
            Err(e) => {
                warn!(error = %e, "failed to wipe volatile cache");
                self.shared
                    .hub
                    .emit_warning_with_context("failed to wipe volatile cache", e.to_string());
                false
            }
        };
        self.shared
            .hub
            .emit(AppEvent::General(GeneralEvent::ShutdownCompleted { cache_wiped }));
        info!(cache_wiped, "packager shut down");
    }
}

impl Drop for Packager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
