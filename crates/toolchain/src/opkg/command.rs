//! Command line builder for the opkg binary

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One opkg invocation, always bound to the generated configuration file
#[derive(Debug, Clone)]
pub(crate) struct OpkgCommand {
    program: PathBuf,
    config_file: PathBuf,
    args: Vec<String>,
}

impl OpkgCommand {
    pub(crate) fn new(program: &Path, config_file: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            config_file: config_file.to_path_buf(),
            args: Vec::new(),
        }
    }

    pub(crate) fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub(crate) fn arg_if<S: AsRef<str>>(&mut self, condition: bool, arg: S) -> &mut Self {
        if condition {
            self.arg(arg);
        }
        self
    }

    /// Subcommand and arguments, without the binary and config flag
    #[cfg(test)]
    pub(crate) fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Human readable form used in logs and errors
    pub(crate) fn display(&self) -> String {
        format!("{} {}", self.program.display(), self.args.join(" "))
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-f")
            .arg(&self.config_file)
            .args(&self.args)
            .stdin(Stdio::null());
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_args() {
        let mut cmd = OpkgCommand::new(Path::new("opkg"), Path::new("/tmp/p/opkg.conf"));
        cmd.arg("install")
            .arg_if(true, "--download-only")
            .arg_if(false, "--nodeps")
            .arg("foo=1.0");
        assert_eq!(cmd.get_args(), ["install", "--download-only", "foo=1.0"]);
        assert_eq!(cmd.display(), "opkg install --download-only foo=1.0");
    }
}
