//! systemd adapter: unit files via `tee`, lifecycle via `systemctl`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ServiceManager};
use crate::domain::ServiceState;
use crate::infra::command_runner::{elevated, ensure_success};

pub struct Systemctl<R: CommandRunner> {
    runner: R,
    elevate: bool,
}

impl<R: CommandRunner> Systemctl<R> {
    pub fn new(runner: R, elevate: bool) -> Self {
        Self { runner, elevate }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<()> {
        let (program, argv) = elevated(self.elevate, "systemctl", args);
        let output = self
            .runner
            .run(program, &argv)
            .await
            .with_context(|| format!("systemctl {}", args.join(" ")))?;
        ensure_success("systemctl", output)?;
        Ok(())
    }
}

impl<R: CommandRunner> ServiceManager for Systemctl<R> {
    async fn install_unit(&self, path: &Path, content: &str) -> Result<()> {
        let target = path.to_string_lossy();
        let (program, args) = elevated(self.elevate, "tee", &[target.as_ref()]);
        let output = self
            .runner
            .run_with_stdin(program, &args, content.as_bytes())
            .await
            .with_context(|| format!("writing {target}"))?;
        ensure_success("tee", output)?;
        Ok(())
    }

    async fn daemon_reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"]).await
    }

    async fn enable(&self, unit: &str) -> Result<()> {
        self.systemctl(&["enable", unit]).await
    }

    async fn restart(&self, unit: &str) -> Result<()> {
        self.systemctl(&["restart", unit]).await
    }

    async fn state(&self, unit: &str) -> Result<ServiceState> {
        // Non-zero for anything but active; the state word is still printed.
        let output = self
            .runner
            .run("systemctl", &["is-active", unit])
            .await
            .with_context(|| format!("systemctl is-active {unit}"))?;
        Ok(ServiceState::parse(&String::from_utf8_lossy(&output.stdout)))
    }
}
