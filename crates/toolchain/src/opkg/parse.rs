//! Recognition of opkg's line oriented progress output

use pkgd_errors::ToolchainError;

use crate::{ToolchainPhase, ToolchainProgress};

/// A progress-relevant line printed by opkg
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputLine {
    Downloading { url: String },
    Installing { package: String },
    Upgrading { package: String },
    Configuring { package: String },
    UpToDate { package: String },
}

impl OutputLine {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let first_word = |rest: &str| {
            rest.split_whitespace()
                .next()
                .map(|w| w.trim_end_matches('.').to_string())
        };

        if let Some(rest) = line.strip_prefix("Downloading ") {
            return first_word(rest).map(|url| Self::Downloading { url });
        }
        if let Some(rest) = line.strip_prefix("Installing ") {
            return first_word(rest).map(|package| Self::Installing { package });
        }
        if let Some(rest) = line.strip_prefix("Upgrading ") {
            return first_word(rest).map(|package| Self::Upgrading { package });
        }
        if let Some(rest) = line.strip_prefix("Configuring ") {
            return first_word(rest).map(|package| Self::Configuring { package });
        }
        if line.starts_with("Package ") && line.ends_with("is up to date.") {
            return first_word(&line["Package ".len()..]).map(|package| Self::UpToDate { package });
        }
        None
    }

    /// Progress implied by the line; opkg prints no percentages itself
    pub(crate) fn progress(&self) -> ToolchainProgress {
        match self {
            Self::Downloading { .. } => ToolchainProgress::new(ToolchainPhase::Downloading, 25),
            Self::Installing { .. } | Self::Upgrading { .. } => {
                ToolchainProgress::new(ToolchainPhase::Installing, 60)
            }
            Self::Configuring { .. } | Self::UpToDate { .. } => {
                ToolchainProgress::new(ToolchainPhase::Installing, 90)
            }
        }
    }
}

/// Last non-blank line of a diagnostic stream, usually the actual error
pub(crate) fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Map a failed opkg run onto the error taxonomy using its diagnostics
pub(crate) fn classify_failure(
    command: &str,
    status: i32,
    stderr: &str,
    package: &str,
) -> ToolchainError {
    let summary = last_line(stderr);

    if stderr.contains("Unknown package") || stderr.contains("Cannot find package") {
        ToolchainError::PackageNotFound {
            package: package.to_string(),
        }
    } else if stderr.contains("Signature check failed") {
        ToolchainError::SignatureCheckFailed {
            package: package.to_string(),
        }
    } else if stderr.contains("Cannot satisfy the following dependencies")
        || stderr.contains("cannot find dependency")
    {
        ToolchainError::DependencyFailed { message: summary }
    } else if stderr.contains("Failed to download") || stderr.contains("wget returned") {
        ToolchainError::DownloadFailed { message: summary }
    } else {
        ToolchainError::CommandFailed {
            command: command.to_string(),
            status,
            message: summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_lines() {
        assert_eq!(
            OutputLine::parse("Downloading https://feeds.example/base/foo_1.0_arm.ipk."),
            Some(OutputLine::Downloading {
                url: "https://feeds.example/base/foo_1.0_arm.ipk".into()
            })
        );
        assert_eq!(
            OutputLine::parse("Installing foo (1.0) on root."),
            Some(OutputLine::Installing {
                package: "foo".into()
            })
        );
        assert_eq!(
            OutputLine::parse("Upgrading foo on root from 0.9 to 1.0..."),
            Some(OutputLine::Upgrading {
                package: "foo".into()
            })
        );
        assert_eq!(
            OutputLine::parse("Configuring foo."),
            Some(OutputLine::Configuring {
                package: "foo".into()
            })
        );
        assert_eq!(
            OutputLine::parse("Package foo (1.0) installed in root is up to date."),
            Some(OutputLine::UpToDate {
                package: "foo".into()
            })
        );
        assert_eq!(OutputLine::parse("Collected errors:"), None);
        assert_eq!(OutputLine::parse(""), None);
    }

    #[test]
    fn test_progress_is_non_decreasing_through_phases() {
        let lines = [
            "Downloading http://x/foo.ipk.",
            "Installing foo (1.0) on root.",
            "Configuring foo.",
        ];
        let percents: Vec<u8> = lines
            .iter()
            .filter_map(|l| OutputLine::parse(l))
            .map(|l| l.progress().percent)
            .collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_classify_failure() {
        let err = classify_failure(
            "opkg install foo",
            255,
            "Collected errors:\n * opkg_install_cmd: Unknown package 'foo'.\n",
            "foo",
        );
        assert!(matches!(err, ToolchainError::PackageNotFound { .. }));

        let err = classify_failure("opkg update", 1, " * opkg_download: Failed to download http://x\n", "");
        assert!(matches!(err, ToolchainError::DownloadFailed { .. }));

        let err = classify_failure("opkg install foo", 3, "boom\n", "foo");
        match err {
            ToolchainError::CommandFailed {
                status, message, ..
            } => {
                assert_eq!(status, 3);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
