//! Numeric status codes reported to observers and hosts
//!
//! Every public operation has a `u32` form so hosts that speak in plain
//! status codes (IPC bridges, plugin frameworks) can forward results
//! unchanged. `NONE` is the only success value.

pub const NONE: u32 = 0;
pub const GENERAL: u32 = 1;
pub const UNAVAILABLE: u32 = 2;
pub const IN_PROGRESS: u32 = 3;
pub const NOT_CONFIGURED: u32 = 4;
pub const ALREADY_CONFIGURED: u32 = 5;
pub const TOOLCHAIN_INIT_FAILED: u32 = 6;
pub const TOOLCHAIN: u32 = 7;
pub const ABORTED: u32 = 8;
pub const INVALID_REQUEST: u32 = 9;
pub const CONFIG: u32 = 10;
pub const PROTOCOL_MISUSE: u32 = 11;

/// Short symbolic name for a status code, used in logs and CLI output
#[must_use]
pub fn name(code: u32) -> &'static str {
    match code {
        NONE => "none",
        GENERAL => "general",
        UNAVAILABLE => "unavailable",
        IN_PROGRESS => "in_progress",
        NOT_CONFIGURED => "not_configured",
        ALREADY_CONFIGURED => "already_configured",
        TOOLCHAIN_INIT_FAILED => "toolchain_init_failed",
        TOOLCHAIN => "toolchain",
        ABORTED => "aborted",
        INVALID_REQUEST => "invalid_request",
        CONFIG => "config",
        PROTOCOL_MISUSE => "protocol_misuse",
        _ => "unknown",
    }
}
