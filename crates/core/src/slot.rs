//! The single "what is happening now" record

use pkgd_errors::Error;
use pkgd_types::{ActivityKind, PackageDescriptor};

use crate::InstallationHandle;

/// Activity occupying the slot
///
/// Package activities always carry their handle and a sync never does, so
/// the descriptor invariants hold by construction.
#[derive(Debug, Clone)]
pub(crate) enum SlotEntry {
    Package(InstallationHandle),
    RepoSync { activity_id: u64 },
}

impl SlotEntry {
    pub(crate) fn activity_id(&self) -> u64 {
        match self {
            Self::Package(handle) => handle.activity_id(),
            Self::RepoSync { activity_id } => *activity_id,
        }
    }

    pub(crate) fn kind(&self) -> ActivityKind {
        match self {
            Self::Package(handle) if handle.is_download_only() => ActivityKind::Download,
            Self::Package(_) => ActivityKind::Install,
            Self::RepoSync { .. } => ActivityKind::RepoSync,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ActivitySlot {
    entry: Option<SlotEntry>,
    last_activity_id: u64,
}

impl ActivitySlot {
    pub(crate) fn kind(&self) -> ActivityKind {
        self.entry.as_ref().map_or(ActivityKind::None, SlotEntry::kind)
    }

    pub(crate) fn entry(&self) -> Option<&SlotEntry> {
        self.entry.as_ref()
    }

    pub(crate) fn handle(&self) -> Option<&InstallationHandle> {
        match &self.entry {
            Some(SlotEntry::Package(handle)) => Some(handle),
            _ => None,
        }
    }

    fn next_activity_id(&mut self) -> Result<u64, Error> {
        if self.entry.is_some() {
            return Err(Error::InProgress);
        }
        self.last_activity_id += 1;
        Ok(self.last_activity_id)
    }

    /// Occupy the slot with an install or download
    pub(crate) fn admit_package(
        &mut self,
        package: PackageDescriptor,
        download_only: bool,
    ) -> Result<InstallationHandle, Error> {
        let activity_id = self.next_activity_id()?;
        let handle = InstallationHandle::new(activity_id, package, download_only);
        self.entry = Some(SlotEntry::Package(handle.clone()));
        Ok(handle)
    }

    /// Occupy the slot with a repository sync
    pub(crate) fn admit_sync(&mut self) -> Result<u64, Error> {
        let activity_id = self.next_activity_id()?;
        self.entry = Some(SlotEntry::RepoSync { activity_id });
        Ok(activity_id)
    }

    /// Release the slot if it still holds `activity_id`
    pub(crate) fn clear(&mut self, activity_id: u64) -> bool {
        if self.entry.as_ref().map(SlotEntry::activity_id) == Some(activity_id) {
            self.entry = None;
            true
        } else {
            false
        }
    }
}
