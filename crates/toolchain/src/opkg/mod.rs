//! Toolchain binding that drives the `opkg` command line tool

mod command;
mod parse;

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::thread;

use pkgd_config::PackagerConfig;
use pkgd_errors::ToolchainError;
use pkgd_types::{InstallOutcome, InstallRequest, RefreshMode};
use tracing::{debug, error, info, trace, warn};

use crate::{ProgressControl, ProgressSink, Toolchain};
use command::OpkgCommand;
use parse::{classify_failure, last_line, OutputLine};

#[derive(Debug, Clone)]
struct Settings {
    binary: PathBuf,
    config_file: PathBuf,
    lists_dir: PathBuf,
}

/// [`Toolchain`] implementation running the `opkg` binary as a child process
#[derive(Debug, Default)]
pub struct OpkgToolchain {
    settings: Option<Settings>,
}

impl OpkgToolchain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn settings(&self) -> Result<&Settings, ToolchainError> {
        self.settings.as_ref().ok_or(ToolchainError::NotConfigured)
    }

    fn command(&self) -> Result<OpkgCommand, ToolchainError> {
        let settings = self.settings()?;
        Ok(OpkgCommand::new(&settings.binary, &settings.config_file))
    }

    /// Whether package lists from an earlier refresh are present
    fn has_package_lists(lists_dir: &Path) -> bool {
        fs::read_dir(lists_dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }
}

/// Run to completion, returning stderr on a non-zero exit
fn run(cmd: &OpkgCommand) -> Result<(), (i32, String)> {
    debug!(command = %cmd.display(), "running toolchain command");
    let output = cmd
        .to_command()
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| (-1, e.to_string()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err((
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

/// Drain stderr on a helper thread so a chatty child cannot fill the pipe
fn collect_stderr(child: &mut Child) -> Option<thread::JoinHandle<String>> {
    let mut stderr = child.stderr.take()?;
    Some(thread::spawn(move || {
        let mut text = String::new();
        let _ = stderr.read_to_string(&mut text);
        text
    }))
}

impl Toolchain for OpkgToolchain {
    fn configure(&mut self, config: &PackagerConfig) -> Result<(), ToolchainError> {
        self.settings = None;
        let settings = Settings {
            binary: config.toolchain_binary.clone(),
            config_file: config.toolchain_config_path(),
            lists_dir: config.lists_dir.clone(),
        };

        // Reading the architecture list makes opkg parse the new configuration.
        let mut probe = OpkgCommand::new(&settings.binary, &settings.config_file);
        probe.arg("print-architecture");
        run(&probe).map_err(|(_, stderr)| ToolchainError::InitFailed {
            message: last_line(&stderr),
        })?;

        info!(binary = %settings.binary.display(), "opkg toolchain initialised");
        self.settings = Some(settings);
        Ok(())
    }

    fn refresh(&mut self, mode: RefreshMode) -> Result<(), ToolchainError> {
        let settings = self.settings()?;
        if mode == RefreshMode::Setup && Self::has_package_lists(&settings.lists_dir) {
            debug!(lists_dir = %settings.lists_dir.display(), "package lists present, skipping update");
            return Ok(());
        }

        let mut cmd = self.command()?;
        cmd.arg("update");
        run(&cmd).map_err(|(status, stderr)| {
            error!(%mode, status, "repository update failed");
            ToolchainError::RefreshFailed {
                message: last_line(&stderr),
            }
        })
    }

    fn install(
        &mut self,
        request: &InstallRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<InstallOutcome, ToolchainError> {
        let target = request.package.install_target();
        let mut cmd = self.command()?;
        cmd.arg("install")
            .arg_if(request.download_only, "--download-only")
            .arg_if(request.no_deps, "--nodeps")
            .arg(&target);

        debug!(command = %cmd.display(), "starting package install");
        let mut child = cmd
            .to_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stderr = collect_stderr(&mut child);

        let mut upgraded = false;
        let mut aborted = false;
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "failed to read opkg output");
                        break;
                    }
                }
                // Package descriptions are not guaranteed to be UTF-8.
                let line = String::from_utf8_lossy(&buf);
                trace!(line = %line, "opkg");
                if sink.should_abort() {
                    aborted = true;
                    break;
                }
                let Some(parsed) = OutputLine::parse(&line) else {
                    continue;
                };
                upgraded |= matches!(parsed, OutputLine::Upgrading { .. });
                if sink.report(parsed.progress()) == ProgressControl::Abort {
                    aborted = true;
                    break;
                }
            }
        }

        if aborted {
            info!(package = %target, "aborting toolchain install");
            // The child may already have exited on its own.
            let _ = child.kill();
            let _ = child.wait();
            if let Some(handle) = stderr {
                let _ = handle.join();
            }
            return Err(ToolchainError::Aborted);
        }

        let status = child.wait()?;
        let stderr = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(classify_failure(
                &cmd.display(),
                status.code().unwrap_or(-1),
                &stderr,
                request.package.name(),
            ));
        }

        Ok(if request.download_only {
            InstallOutcome::Downloaded
        } else if upgraded {
            InstallOutcome::Upgraded
        } else {
            InstallOutcome::Installed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_toolchain_rejects_work() {
        let mut toolchain = OpkgToolchain::new();
        assert!(matches!(
            toolchain.refresh(RefreshMode::Forced),
            Err(ToolchainError::NotConfigured)
        ));
    }

    #[test]
    fn test_missing_binary_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let config = PackagerConfig {
            temp_dir: dir.path().join("tmp"),
            toolchain_binary: dir.path().join("no-such-opkg"),
            ..PackagerConfig::default()
        };
        let mut toolchain = OpkgToolchain::new();
        assert!(matches!(
            toolchain.configure(&config),
            Err(ToolchainError::InitFailed { .. })
        ));
    }

    #[test]
    fn test_package_lists_detection() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!OpkgToolchain::has_package_lists(dir.path()));
        fs::write(dir.path().join("base"), "Package: foo\n").unwrap();
        assert!(OpkgToolchain::has_package_lists(dir.path()));
        assert!(!OpkgToolchain::has_package_lists(&dir.path().join("missing")));
    }

    /// Configure a toolchain whose binary is a shell script printing `install_output`
    #[cfg(unix)]
    fn scripted_toolchain(dir: &Path, install_output: &str) -> OpkgToolchain {
        use std::os::unix::fs::PermissionsExt;

        let binary = dir.join("opkg");
        let script = format!(
            "#!/bin/sh\nif [ \"$3\" = install ]; then\n{install_output}fi\nexit 0\n"
        );
        fs::write(&binary, script).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        let config = PackagerConfig {
            temp_dir: dir.join("tmp"),
            lists_dir: dir.join("lists"),
            toolchain_binary: binary,
            ..PackagerConfig::default()
        };
        let mut toolchain = OpkgToolchain::new();
        toolchain.configure(&config).unwrap();
        toolchain
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_output_does_not_stop_progress() {
        use crate::{ToolchainPhase, ToolchainProgress};
        use pkgd_types::PackageDescriptor;

        let dir = tempfile::tempdir().unwrap();
        let mut toolchain = scripted_toolchain(
            dir.path(),
            "printf 'Description: caf\\351\\n'\n\
             echo 'Upgrading foo on root from 0.9 to 1.0...'\n\
             echo 'Configuring foo.'\n",
        );

        let mut reports = Vec::new();
        let mut sink = |progress: ToolchainProgress| {
            reports.push(progress);
            ProgressControl::Continue
        };
        let request = InstallRequest::new(PackageDescriptor::new("foo", "1.0", ""));
        let outcome = toolchain.install(&request, &mut sink).unwrap();

        assert_eq!(outcome, InstallOutcome::Upgraded);
        assert_eq!(
            reports,
            [
                ToolchainProgress::new(ToolchainPhase::Installing, 60),
                ToolchainProgress::new(ToolchainPhase::Installing, 90),
            ]
        );
    }
}
