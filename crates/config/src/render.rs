//! Rendering of the on-disk toolchain configuration
//!
//! The output depends only on the [`PackagerConfig`] values, so rendering the
//! same configuration twice yields byte-identical files.

use crate::PackagerConfig;
use std::fmt::Write as _;

const HEADER: &str = "# Generated by pkgd from its configuration. Changes are overwritten.";

impl PackagerConfig {
    /// Render the toolchain configuration file contents
    #[must_use]
    pub fn render_toolchain_config(&self) -> String {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');

        for feed in &self.feeds {
            let directive = if feed.compressed { "src/gz" } else { "src" };
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{directive} {} {}", feed.name, feed.url);
        }

        let _ = writeln!(out, "dest root {}", self.root_dir.display());

        let mut architectures = self.architectures.clone();
        architectures.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.name.cmp(&b.name)));
        for arch in &architectures {
            let _ = writeln!(out, "arch {} {}", arch.name, arch.priority);
        }

        let _ = writeln!(out, "option tmp_dir {}", self.temp_dir.display());
        let _ = writeln!(out, "option cache_dir {}", self.cache_dir.display());
        let _ = writeln!(out, "option lists_dir {}", self.lists_dir.display());
        let _ = writeln!(out, "option verbosity {}", self.verbosity);
        let _ = writeln!(
            out,
            "option check_signature {}",
            u8::from(!self.no_signature_check)
        );
        if self.volatile_cache {
            out.push_str("option volatile_cache 1\n");
        }
        if self.no_deps {
            out.push_str("option nodeps 1\n");
        }
        out
    }
}
