use serde::{Deserialize, Serialize};

/// Remote package feed the toolchain refreshes its indices from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_compressed")]
    pub compressed: bool,
}

impl FeedConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            compressed: default_compressed(),
        }
    }
}

/// Architecture accepted by the toolchain, higher priority wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
}

impl ArchitectureConfig {
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }
}

fn default_compressed() -> bool {
    true
}

fn default_priority() -> u32 {
    1
}
