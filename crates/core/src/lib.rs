#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Orchestration core of pkgd
//!
//! [`Packager`] admits one activity at a time into the activity slot and
//! hands it to the install worker thread, which drives the
//! [`pkgd_toolchain::RepositoryStore`] and reports every state change to the
//! registered [`PackagerObserver`]s.

mod descriptor;
mod hub;
mod packager;
mod slot;
mod worker;

pub use descriptor::{InstallationDescriptor, InstallationHandle};
pub use hub::PackagerObserver;
pub use packager::Packager;
pub use worker::WORKER_THREAD_NAME;

pub use pkgd_errors::Error;
pub use pkgd_types::{ActivityKind, InstallState, PackageDescriptor};
