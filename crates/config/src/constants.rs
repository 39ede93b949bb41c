//! Default filesystem locations and environment variable names for pkgd
//!
//! These are only fallbacks; every path can be overridden from the
//! configuration file.

pub const DEFAULT_TEMP_DIR: &str = "/tmp/pkgd";
pub const DEFAULT_CACHE_DIR: &str = "/var/cache/pkgd";
pub const DEFAULT_LISTS_DIR: &str = "/var/lib/pkgd/lists";
pub const DEFAULT_ROOT_DIR: &str = "/";
pub const DEFAULT_TOOLCHAIN_BINARY: &str = "opkg";

/// File name used for the generated toolchain configuration when no explicit
/// `config_file` is set; it is placed inside the temp directory.
pub const GENERATED_CONFIG_NAME: &str = "opkg.conf";

pub const CONFIG_DIR_NAME: &str = "pkgd";
pub const CONFIG_FILE_NAME: &str = "pkgd.toml";

pub const ENV_TEMP_DIR: &str = "PKGD_TEMP_DIR";
pub const ENV_CACHE_DIR: &str = "PKGD_CACHE_DIR";
pub const ENV_VERBOSITY: &str = "PKGD_VERBOSITY";
pub const ENV_NO_DEPS: &str = "PKGD_NO_DEPS";
pub const ENV_NO_SIGNATURE_CHECK: &str = "PKGD_NO_SIGNATURE_CHECK";
pub const ENV_ALWAYS_UPDATE_FIRST: &str = "PKGD_ALWAYS_UPDATE_FIRST";
