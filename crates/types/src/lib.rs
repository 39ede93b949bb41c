#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the pkgd package-installation manager
//!
//! This crate provides the value types shared by the toolchain binding,
//! the packager core and the CLI: package identity, installation states,
//! activity kinds and repository refresh modes.

pub mod package;
pub mod state;

// Re-export commonly used types
pub use package::{InstallRequest, PackageDescriptor};
pub use state::{ActivityKind, InstallOutcome, InstallState, RefreshMode};
