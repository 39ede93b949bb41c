//! Installation descriptor and the handle callers poll it through

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use pkgd_errors::{codes, Error};
use pkgd_types::{InstallState, PackageDescriptor};

/// Mutable record of one install or download
///
/// Written only by the install worker; every field is atomic so readers on
/// other threads never block and never see a torn value.
#[derive(Debug)]
pub struct InstallationDescriptor {
    state: AtomicU8,
    progress: AtomicU8,
    error_code: AtomicU32,
    abort_requested: AtomicBool,
    activity_id: u64,
}

impl InstallationDescriptor {
    pub(crate) fn new(activity_id: u64) -> Self {
        Self {
            state: AtomicU8::new(InstallState::Idle.as_u8()),
            progress: AtomicU8::new(0),
            error_code: AtomicU32::new(codes::NONE),
            abort_requested: AtomicBool::new(false),
            activity_id,
        }
    }

    #[must_use]
    pub fn state(&self) -> InstallState {
        InstallState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Percentage in 0..=100; never decreases during an activity
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }

    /// Status code of the terminal state, `codes::NONE` until then or on success
    #[must_use]
    pub fn error_code(&self) -> u32 {
        self.error_code.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_abort_requested(&self) -> bool {
        self.abort_requested.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn activity_id(&self) -> u64 {
        self.activity_id
    }

    /// Request cooperative cancellation
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] once the installation is terminal or an
    /// abort was already requested.
    pub fn abort(&self) -> Result<(), Error> {
        if self.state().is_terminal() {
            return Err(Error::Unavailable);
        }
        self.abort_requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Unavailable)?;

        // `finish` may have landed between the check and the flag.
        if self.state().is_terminal() {
            self.abort_requested.store(false, Ordering::Release);
            return Err(Error::Unavailable);
        }
        Ok(())
    }

    /// Move to `next` and raise progress to `percent`
    ///
    /// Returns the previous state when the transition was accepted, `None`
    /// when it would lower the rank or leave a terminal state.
    pub(crate) fn advance(&self, next: InstallState, percent: u8) -> Option<InstallState> {
        let mut current = self.state();
        loop {
            if !current.can_transition_to(next) {
                return None;
            }
            match self.state.compare_exchange(
                current.as_u8(),
                next.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = InstallState::from_u8(actual).unwrap_or_default(),
            }
        }
        self.progress.fetch_max(percent.min(100), Ordering::AcqRel);
        Some(current)
    }

    /// Record the terminal state; the error code is visible before the state
    pub(crate) fn finish(&self, terminal: InstallState, error_code: u32) -> bool {
        debug_assert!(terminal.is_terminal());
        if self.state().is_terminal() {
            return false;
        }
        self.error_code.store(error_code, Ordering::Release);
        let percent = if terminal.is_success() { 100 } else { 0 };
        self.advance(terminal, percent).is_some()
    }
}

/// Shared handle to one installation activity
///
/// Stays valid after the packager cleared its slot; the values then remain
/// frozen at the terminal state. Use [`crate::Packager::is_current`] to tell
/// whether the handle still refers to the running activity.
#[derive(Debug, Clone)]
pub struct InstallationHandle {
    descriptor: Arc<InstallationDescriptor>,
    package: Arc<PackageDescriptor>,
    download_only: bool,
}

impl InstallationHandle {
    pub(crate) fn new(activity_id: u64, package: PackageDescriptor, download_only: bool) -> Self {
        Self {
            descriptor: Arc::new(InstallationDescriptor::new(activity_id)),
            package: Arc::new(package),
            download_only,
        }
    }

    pub(crate) fn descriptor(&self) -> &InstallationDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn package(&self) -> &PackageDescriptor {
        &self.package
    }

    /// Shared ownership of the package descriptor
    #[must_use]
    pub fn package_arc(&self) -> Arc<PackageDescriptor> {
        Arc::clone(&self.package)
    }

    #[must_use]
    pub fn is_download_only(&self) -> bool {
        self.download_only
    }

    #[must_use]
    pub fn state(&self) -> InstallState {
        self.descriptor.state()
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.descriptor.progress()
    }

    #[must_use]
    pub fn error_code(&self) -> u32 {
        self.descriptor.error_code()
    }

    #[must_use]
    pub fn activity_id(&self) -> u64 {
        self.descriptor.activity_id()
    }

    /// See [`InstallationDescriptor::abort`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] when the installation can no longer be
    /// aborted.
    pub fn abort(&self) -> Result<(), Error> {
        self.descriptor.abort()
    }

    /// Whether both handles refer to the same activity
    #[must_use]
    pub fn same_activity(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.descriptor, &other.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> InstallationHandle {
        InstallationHandle::new(1, PackageDescriptor::new("foo", "1.0", "arm"), false)
    }

    #[test]
    fn test_new_descriptor_is_idle() {
        let h = handle();
        assert_eq!(h.state(), InstallState::Idle);
        assert_eq!(h.progress(), 0);
        assert_eq!(h.error_code(), codes::NONE);
        assert_eq!(h.activity_id(), 1);
    }

    #[test]
    fn test_advance_rejects_regression() {
        let h = handle();
        let d = h.descriptor();
        assert_eq!(
            d.advance(InstallState::Installing, 60),
            Some(InstallState::Idle)
        );
        assert_eq!(d.advance(InstallState::Downloading, 90), None);
        assert_eq!(h.state(), InstallState::Installing);
        assert_eq!(h.progress(), 60);
    }

    #[test]
    fn test_progress_never_decreases() {
        let h = handle();
        let d = h.descriptor();
        d.advance(InstallState::Downloading, 40);
        d.advance(InstallState::Downloading, 10);
        assert_eq!(h.progress(), 40);
    }

    #[test]
    fn test_finish_once() {
        let h = handle();
        assert!(h.descriptor().finish(InstallState::Installed, codes::NONE));
        assert_eq!(h.progress(), 100);
        assert!(!h.descriptor().finish(InstallState::Failed, codes::TOOLCHAIN));
        assert_eq!(h.state(), InstallState::Installed);
        assert_eq!(h.error_code(), codes::NONE);
    }

    #[test]
    fn test_abort_once_then_unavailable() {
        let h = handle();
        assert!(h.abort().is_ok());
        assert!(h.descriptor().is_abort_requested());
        assert!(matches!(h.abort(), Err(Error::Unavailable)));
    }

    #[test]
    fn test_abort_after_terminal_is_unavailable() {
        let h = handle();
        h.descriptor().finish(InstallState::Failed, codes::TOOLCHAIN);
        assert!(matches!(h.abort(), Err(Error::Unavailable)));
        assert!(!h.descriptor().is_abort_requested());
    }

    #[test]
    fn test_abort_racing_finish_never_succeeds_on_terminal() {
        for _ in 0..200 {
            let h = handle();
            let finisher = {
                let h = h.clone();
                std::thread::spawn(move || {
                    h.descriptor().finish(InstallState::Installed, codes::NONE);
                })
            };
            let aborted = h.abort().is_ok();
            finisher.join().unwrap();

            assert_eq!(h.state(), InstallState::Installed);
            // An accepted abort must have been requested while still running,
            // so the flag stays set; a rejected one leaves it clear.
            assert_eq!(h.descriptor().is_abort_requested(), aborted);
        }
    }

    #[test]
    fn test_clones_share_activity() {
        let a = handle();
        let b = a.clone();
        assert!(a.same_activity(&b));
        assert!(!a.same_activity(&handle()));
    }

    proptest::proptest! {
        #[test]
        fn prop_state_and_progress_never_regress(
            steps in proptest::collection::vec((0u8..=7, 0u8..=100), 0..32)
        ) {
            let h = handle();
            let d = h.descriptor();
            let mut last = (h.state(), h.progress());
            for (state, percent) in steps {
                let next = InstallState::from_u8(state).unwrap();
                if next.is_terminal() {
                    d.finish(next, codes::GENERAL);
                } else {
                    d.advance(next, percent);
                }
                let now = (h.state(), h.progress());
                proptest::prop_assert!(now.0.rank() >= last.0.rank());
                proptest::prop_assert!(now.1 >= last.1);
                if last.0.is_terminal() {
                    proptest::prop_assert_eq!(now, last);
                }
                last = now;
            }
        }
    }
}
