//! Debian/Raspberry Pi OS host adapter: `uname`, `dpkg-query`, `apt-get`.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostSystem};
use crate::infra::command_runner::{LONG_CMD_TIMEOUT, elevated, ensure_success};

/// Host inspection and package management through the system tools.
pub struct DebianHost<R: CommandRunner> {
    runner: R,
    elevate: bool,
}

impl<R: CommandRunner> DebianHost<R> {
    pub fn new(runner: R, elevate: bool) -> Self {
        Self { runner, elevate }
    }
}

impl<R: CommandRunner> HostSystem for DebianHost<R> {
    async fn machine(&self) -> Result<String> {
        let output = ensure_success("uname", self.runner.run("uname", &["-m"]).await?)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn is_installed(&self, package: &str) -> Result<bool> {
        // Exits non-zero for packages dpkg has never heard of.
        let output = self
            .runner
            .run("dpkg-query", &["-W", "-f=${Status}", package])
            .await?;
        Ok(output.status.success()
            && String::from_utf8_lossy(&output.stdout).contains("install ok installed"))
    }

    async fn install(&self, packages: &[&str]) -> Result<()> {
        let (program, args) = elevated(self.elevate, "apt-get", &["update", "-qq"]);
        let output = self
            .runner
            .run_with_timeout(program, &args, LONG_CMD_TIMEOUT)
            .await
            .context("apt-get update")?;
        ensure_success("apt-get update", output)?;

        let mut install = vec!["DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y"];
        install.extend_from_slice(packages);
        let (program, args) = if self.elevate {
            ("sudo", install)
        } else {
            ("env", install)
        };
        let output = self
            .runner
            .run_with_timeout(program, &args, LONG_CMD_TIMEOUT)
            .await
            .context("apt-get install")?;
        ensure_success("apt-get install", output)?;
        Ok(())
    }
}
