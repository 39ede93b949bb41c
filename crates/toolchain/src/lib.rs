#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Repository store and package-management toolchain binding for pkgd
//!
//! The [`Toolchain`] trait is the capability boundary to the external package
//! engine. [`RepositoryStore`] owns exactly one toolchain together with the
//! filesystem layout it works in; [`OpkgToolchain`] drives the `opkg` binary.

mod opkg;
mod progress;
mod store;

pub use opkg::OpkgToolchain;
pub use progress::{ProgressControl, ProgressSink, ToolchainPhase, ToolchainProgress};
pub use store::{RepositoryStore, StoreLayout};

use pkgd_config::PackagerConfig;
use pkgd_errors::ToolchainError;
use pkgd_types::{InstallOutcome, InstallRequest, RefreshMode};

/// External package engine performing refresh, resolution and installation
///
/// Calls block until the toolchain finishes. A toolchain is only ever used
/// from one thread at a time.
pub trait Toolchain: Send {
    /// (Re)initialise the toolchain against a freshly written configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the toolchain refuses the configuration.
    fn configure(&mut self, config: &PackagerConfig) -> Result<(), ToolchainError>;

    /// Refresh the local package metadata
    ///
    /// # Errors
    ///
    /// Returns an error if the remote indices cannot be fetched.
    fn refresh(&mut self, mode: RefreshMode) -> Result<(), ToolchainError>;

    /// Install or download one package, reporting progress through `sink`
    ///
    /// Returns [`ToolchainError::Aborted`] once the sink asked to stop.
    ///
    /// # Errors
    ///
    /// Returns an error for resolution, download, signature or install failures.
    fn install(
        &mut self,
        request: &InstallRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<InstallOutcome, ToolchainError>;
}

impl<T: Toolchain + ?Sized> Toolchain for Box<T> {
    fn configure(&mut self, config: &PackagerConfig) -> Result<(), ToolchainError> {
        (**self).configure(config)
    }

    fn refresh(&mut self, mode: RefreshMode) -> Result<(), ToolchainError> {
        (**self).refresh(mode)
    }

    fn install(
        &mut self,
        request: &InstallRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<InstallOutcome, ToolchainError> {
        (**self).install(request, sink)
    }
}
