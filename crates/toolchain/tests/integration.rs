//! Integration tests for the repository store

#[cfg(test)]
mod tests {
    use pkgd_config::PackagerConfig;
    use pkgd_errors::{Error, ToolchainError};
    use pkgd_toolchain::*;
    use pkgd_types::{InstallOutcome, InstallRequest, PackageDescriptor, RefreshMode};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Calls {
        configured: usize,
        refreshes: Vec<RefreshMode>,
        installs: Vec<String>,
    }

    struct RecordingToolchain {
        calls: Arc<Mutex<Calls>>,
        refuse_init: bool,
    }

    impl Toolchain for RecordingToolchain {
        fn configure(&mut self, _config: &PackagerConfig) -> Result<(), ToolchainError> {
            if self.refuse_init {
                return Err(ToolchainError::InitFailed {
                    message: "bad config".into(),
                });
            }
            self.calls.lock().unwrap().configured += 1;
            Ok(())
        }

        fn refresh(&mut self, mode: RefreshMode) -> Result<(), ToolchainError> {
            self.calls.lock().unwrap().refreshes.push(mode);
            Ok(())
        }

        fn install(
            &mut self,
            request: &InstallRequest,
            sink: &mut dyn ProgressSink,
        ) -> Result<InstallOutcome, ToolchainError> {
            self.calls
                .lock()
                .unwrap()
                .installs
                .push(request.package.install_target());
            for progress in [
                ToolchainProgress::new(ToolchainPhase::Downloading, 30),
                ToolchainProgress::new(ToolchainPhase::Installing, 80),
            ] {
                if sink.report(progress).is_abort() {
                    return Err(ToolchainError::Aborted);
                }
            }
            Ok(InstallOutcome::Installed)
        }
    }

    fn store(refuse_init: bool) -> (RepositoryStore, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let store = RepositoryStore::new(RecordingToolchain {
            calls: Arc::clone(&calls),
            refuse_init,
        });
        (store, calls)
    }

    fn config(root: &TempDir) -> PackagerConfig {
        PackagerConfig {
            temp_dir: root.path().join("tmp"),
            cache_dir: root.path().join("cache"),
            lists_dir: root.path().join("lists"),
            ..PackagerConfig::default()
        }
    }

    #[test]
    fn test_configure_creates_layout_and_config_file() {
        let root = TempDir::new().unwrap();
        let config = config(&root);
        let (mut store, calls) = store(false);

        store.configure(&config).unwrap();

        let layout = store.layout().unwrap();
        assert!(layout.temp_dir.is_dir());
        assert!(layout.cache_dir.is_dir());
        assert!(layout.lists_dir.is_dir());
        let written = std::fs::read_to_string(&layout.config_file).unwrap();
        assert_eq!(written, config.render_toolchain_config());
        assert_eq!(calls.lock().unwrap().configured, 1);
    }

    #[test]
    fn test_reconfigure_rewrites_identical_file() {
        let root = TempDir::new().unwrap();
        let config = config(&root);
        let (mut store, _) = store(false);

        store.configure(&config).unwrap();
        let path = store.layout().unwrap().config_file.clone();
        let first = std::fs::read(&path).unwrap();
        store.configure(&config).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn test_toolchain_refusal_is_init_failure() {
        let root = TempDir::new().unwrap();
        let (mut store, _) = store(true);

        let err = store.configure(&config(&root)).unwrap_err();
        assert!(matches!(err, Error::ToolchainInitFailed { .. }));
        assert!(!store.is_configured());
    }

    #[test]
    fn test_unconfigured_store_rejects_refresh_and_install() {
        let (mut store, calls) = store(false);
        assert!(matches!(
            store.refresh_setup(),
            Err(ToolchainError::NotConfigured)
        ));

        let request = InstallRequest::new(PackageDescriptor::new("foo", "1.0", "arm"));
        let mut sink = |_: ToolchainProgress| ProgressControl::Continue;
        assert!(matches!(
            store.install(&request, &mut sink),
            Err(ToolchainError::NotConfigured)
        ));
        assert!(calls.lock().unwrap().refreshes.is_empty());
    }

    #[test]
    fn test_refresh_modes_reach_toolchain() {
        let root = TempDir::new().unwrap();
        let (mut store, calls) = store(false);
        store.configure(&config(&root)).unwrap();

        store.refresh_setup().unwrap();
        store.refresh_forced().unwrap();
        assert_eq!(
            calls.lock().unwrap().refreshes,
            vec![RefreshMode::Setup, RefreshMode::Forced]
        );
    }

    #[test]
    fn test_install_abort_from_sink() {
        let root = TempDir::new().unwrap();
        let (mut store, calls) = store(false);
        store.configure(&config(&root)).unwrap();

        let request = InstallRequest::new(PackageDescriptor::new("foo", "1.0", "arm"));
        let mut sink = |p: ToolchainProgress| {
            if p.phase == ToolchainPhase::Installing {
                ProgressControl::Abort
            } else {
                ProgressControl::Continue
            }
        };
        assert!(matches!(
            store.install(&request, &mut sink),
            Err(ToolchainError::Aborted)
        ));
        assert_eq!(calls.lock().unwrap().installs, vec!["foo=1.0".to_string()]);
    }

    #[test]
    fn test_wipe_volatile_cache() {
        let root = TempDir::new().unwrap();
        let mut config = config(&root);
        let (mut store, _) = store(false);

        store.configure(&config).unwrap();
        let cache = store.layout().unwrap().cache_dir.clone();
        std::fs::write(cache.join("foo_1.0_arm.ipk"), b"pkg").unwrap();
        assert!(!store.wipe_volatile_cache().unwrap());
        assert!(cache.join("foo_1.0_arm.ipk").exists());

        config.volatile_cache = true;
        store.configure(&config).unwrap();
        std::fs::create_dir_all(cache.join("partial")).unwrap();
        assert!(store.wipe_volatile_cache().unwrap());
        assert!(cache.is_dir());
        assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
    }
}
