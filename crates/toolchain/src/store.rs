//! Repository store: filesystem layout plus the exclusively owned toolchain

use std::fs;
use std::path::{Path, PathBuf};

use pkgd_config::PackagerConfig;
use pkgd_errors::{ConfigError, Error, ToolchainError};
use pkgd_types::{InstallOutcome, InstallRequest, RefreshMode};
use tracing::{debug, info, warn};

use crate::{ProgressSink, Toolchain};

/// Directories and files the toolchain works in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub config_file: PathBuf,
    pub temp_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub lists_dir: PathBuf,
    /// Cache is wiped when the store shuts down
    pub volatile_cache: bool,
}

impl StoreLayout {
    #[must_use]
    pub fn from_config(config: &PackagerConfig) -> Self {
        Self {
            config_file: config.toolchain_config_path(),
            temp_dir: config.temp_dir.clone(),
            cache_dir: config.cache_dir.clone(),
            lists_dir: config.lists_dir.clone(),
            volatile_cache: config.volatile_cache,
        }
    }

    /// Create every directory of the layout
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        let config_dir = self.config_file.parent().filter(|p| !p.as_os_str().is_empty());
        for dir in [
            Some(self.temp_dir.as_path()),
            Some(self.cache_dir.as_path()),
            Some(self.lists_dir.as_path()),
            config_dir,
        ]
        .into_iter()
        .flatten()
        {
            create_dir(dir)?;
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path).map_err(|e| {
        Error::from(ConfigError::DirectoryError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    })
}

/// Owner of the toolchain and of the on-disk layout it operates on
///
/// All toolchain access goes through the store, so holding `&mut
/// RepositoryStore` is holding the toolchain exclusively.
pub struct RepositoryStore {
    toolchain: Box<dyn Toolchain>,
    layout: Option<StoreLayout>,
}

impl std::fmt::Debug for RepositoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryStore")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl RepositoryStore {
    pub fn new(toolchain: impl Toolchain + 'static) -> Self {
        Self {
            toolchain: Box::new(toolchain),
            layout: None,
        }
    }

    #[must_use]
    pub fn layout(&self) -> Option<&StoreLayout> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.layout.is_some()
    }

    /// Apply a configuration: directories, toolchain config file, toolchain init
    ///
    /// The previous layout is dropped first, so a failed call leaves the store
    /// unconfigured.
    ///
    /// # Errors
    ///
    /// Returns a config error for invalid settings or unwritable paths, and
    /// [`Error::ToolchainInitFailed`] when the toolchain rejects the new
    /// configuration.
    pub fn configure(&mut self, config: &PackagerConfig) -> Result<(), Error> {
        self.layout = None;
        config.validate()?;

        let layout = StoreLayout::from_config(config);
        layout.ensure_directories()?;

        let rendered = config.render_toolchain_config();
        fs::write(&layout.config_file, rendered).map_err(|e| ConfigError::WriteError {
            path: layout.config_file.display().to_string(),
            error: e.to_string(),
        })?;
        debug!(path = %layout.config_file.display(), "wrote toolchain configuration");

        self.toolchain
            .configure(config)
            .map_err(|e| Error::ToolchainInitFailed {
                message: e.to_string(),
            })?;

        info!(
            temp_dir = %layout.temp_dir.display(),
            cache_dir = %layout.cache_dir.display(),
            volatile_cache = layout.volatile_cache,
            "repository store configured"
        );
        self.layout = Some(layout);
        Ok(())
    }

    /// Minimal refresh, enough to resolve a package for installation
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured or the refresh fails.
    pub fn refresh_setup(&mut self) -> Result<(), ToolchainError> {
        self.refresh(RefreshMode::Setup)
    }

    /// Full refresh of every remote index
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured or the refresh fails.
    pub fn refresh_forced(&mut self) -> Result<(), ToolchainError> {
        self.refresh(RefreshMode::Forced)
    }

    /// Refresh in the given mode
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured or the refresh fails.
    pub fn refresh(&mut self, mode: RefreshMode) -> Result<(), ToolchainError> {
        if self.layout.is_none() {
            return Err(ToolchainError::NotConfigured);
        }
        debug!(%mode, "refreshing repository metadata");
        self.toolchain.refresh(mode)
    }

    /// Install or download one package
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured or the toolchain fails.
    pub fn install(
        &mut self,
        request: &InstallRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<InstallOutcome, ToolchainError> {
        if self.layout.is_none() {
            return Err(ToolchainError::NotConfigured);
        }
        self.toolchain.install(request, sink)
    }

    /// Remove the cache contents when the layout marks the cache volatile
    ///
    /// Returns whether anything was wiped. The cache directory itself is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry of the cache cannot be removed.
    pub fn wipe_volatile_cache(&self) -> Result<bool, ToolchainError> {
        let Some(layout) = self.layout.as_ref().filter(|l| l.volatile_cache) else {
            return Ok(false);
        };

        let entries = match fs::read_dir(&layout.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = result {
                warn!(path = %path.display(), error = %e, "failed to wipe cache entry");
                return Err(e.into());
            }
        }
        info!(cache_dir = %layout.cache_dir.display(), "volatile cache wiped");
        Ok(true)
    }
}
