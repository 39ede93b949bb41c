//! Package-related type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the package an activity operates on
///
/// Immutable once created. The packager keeps the canonical copy behind an
/// `Arc` for the lifetime of one activity and hands clones of that `Arc` to
/// callers and observers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageDescriptor {
    name: String,
    version: String,
    architecture: String,
}

impl PackageDescriptor {
    /// Create a new package descriptor
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested version; empty means "whatever the feed resolves"
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Requested architecture; empty means the toolchain default
    #[must_use]
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Package argument in the `name=version` form the toolchain understands
    #[must_use]
    pub fn install_target(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{}={}", self.name, self.version)
        }
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.version.is_empty() {
            write!(f, "-{}", self.version)?;
        }
        if !self.architecture.is_empty() {
            write!(f, " ({})", self.architecture)?;
        }
        Ok(())
    }
}

/// Request handed to the toolchain for one install or download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRequest {
    pub package: PackageDescriptor,
    pub download_only: bool,
    pub no_deps: bool,
}

impl InstallRequest {
    /// Create an install request for a package
    #[must_use]
    pub fn new(package: PackageDescriptor) -> Self {
        Self {
            package,
            download_only: false,
            no_deps: false,
        }
    }

    /// Only fetch the package into the cache
    #[must_use]
    pub fn with_download_only(mut self, download_only: bool) -> Self {
        self.download_only = download_only;
        self
    }

    /// Skip dependency installation
    #[must_use]
    pub fn with_no_deps(mut self, no_deps: bool) -> Self {
        self.no_deps = no_deps;
        self
    }
}
