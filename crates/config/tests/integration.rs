//! Integration tests for config

#[cfg(test)]
mod tests {
    use pkgd_config::constants::*;
    use pkgd_config::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            ENV_TEMP_DIR,
            ENV_CACHE_DIR,
            ENV_VERBOSITY,
            ENV_NO_DEPS,
            ENV_NO_SIGNATURE_CHECK,
            ENV_ALWAYS_UPDATE_FIRST,
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
temp_dir = "/tmp/p"
cache_dir = "/var/cache/p"
volatile_cache = true
verbosity = 2
no_deps = true
always_update_first = true

[[feeds]]
name = "base"
url = "https://feeds.example/base"

[[feeds]]
name = "local"
url = "file:///srv/feed"
compressed = false

[[architectures]]
name = "arm"
priority = 10
        "#
        )
        .unwrap();

        let config = PackagerConfig::load_from_file(temp_file.path())
            .await
            .unwrap();
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/p"));
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/p"));
        assert!(config.volatile_cache);
        assert_eq!(config.verbosity, 2);
        assert!(config.no_deps);
        assert!(!config.no_signature_check);
        assert!(config.always_update_first);
        assert_eq!(config.feeds.len(), 2);
        assert!(config.feeds[0].compressed);
        assert!(!config.feeds[1].compressed);
        assert_eq!(config.architectures[0].priority, 10);
        assert_eq!(config.lists_dir, PathBuf::from(DEFAULT_LISTS_DIR));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let result = PackagerConfig::load_from_file(std::path::Path::new(
            "/nonexistent/pkgd/pkgd.toml",
        ))
        .await;
        assert!(matches!(
            result,
            Err(pkgd_errors::Error::Config(
                pkgd_errors::ConfigError::NotFound { .. }
            ))
        ));
    }

    #[test]
    fn test_verbosity_out_of_range_rejected() {
        let result = PackagerConfig::from_toml_str("verbosity = 300");
        assert!(matches!(
            result,
            Err(pkgd_errors::Error::Config(
                pkgd_errors::ConfigError::ParseError { .. }
            ))
        ));
    }

    #[test]
    fn test_malformed_toml_maps_to_config_code() {
        let err = PackagerConfig::from_toml_str("temp_dir = ").unwrap_err();
        assert_eq!(err.code(), pkgd_errors::codes::CONFIG);
        assert!(matches!(
            err,
            pkgd_errors::Error::Config(pkgd_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_TEMP_DIR, "/tmp/from-env");
        std::env::set_var(ENV_VERBOSITY, "4");
        std::env::set_var(ENV_NO_SIGNATURE_CHECK, "yes");

        let mut config = PackagerConfig::default();
        config.merge_env().unwrap();

        assert_eq!(config.temp_dir, PathBuf::from("/tmp/from-env"));
        assert_eq!(config.verbosity, 4);
        assert!(config.no_signature_check);
        assert!(!config.no_deps);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_NO_DEPS, "sometimes");

        let mut config = PackagerConfig::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let config = PackagerConfig {
            cache_dir: PathBuf::new(),
            ..PackagerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(PackagerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shared_volatile_cache() {
        let config = PackagerConfig {
            volatile_cache: true,
            cache_dir: PathBuf::from("/tmp/p"),
            temp_dir: PathBuf::from("/tmp/p"),
            ..PackagerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toolchain_config_path() {
        let mut config = PackagerConfig {
            temp_dir: PathBuf::from("/tmp/p"),
            ..PackagerConfig::default()
        };
        assert_eq!(
            config.toolchain_config_path(),
            PathBuf::from("/tmp/p").join(GENERATED_CONFIG_NAME)
        );

        config.config_file = Some(PathBuf::from("/etc/opkg/pkgd.conf"));
        assert_eq!(
            config.toolchain_config_path(),
            PathBuf::from("/etc/opkg/pkgd.conf")
        );
    }

    #[test]
    fn test_toml_round_trip_preserves_settings() {
        let mut config = PackagerConfig {
            no_deps: true,
            ..PackagerConfig::default()
        };
        config.feeds.push(FeedConfig::new("base", "https://feeds.example/base"));
        let text = config.to_toml_string().unwrap();
        let parsed = PackagerConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
