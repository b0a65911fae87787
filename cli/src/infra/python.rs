//! Python venv adapter: `python3 -m venv` and the venv's own `pip`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, PipRequirements, PythonEnv};
use crate::infra::command_runner::{LONG_CMD_TIMEOUT, ensure_success};

pub struct VenvTool<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> VenvTool<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> PythonEnv for VenvTool<R> {
    async fn create_venv(&self, venv: &Path) -> Result<()> {
        let venv = venv.to_string_lossy();
        let output = self
            .runner
            .run_with_timeout("python3", &["-m", "venv", venv.as_ref()], LONG_CMD_TIMEOUT)
            .await
            .context("python3 -m venv")?;
        ensure_success("python3 -m venv", output)?;
        Ok(())
    }

    async fn pip_install(&self, venv: &Path, requirements: PipRequirements<'_>) -> Result<()> {
        let pip = venv.join("bin").join("pip").to_string_lossy().into_owned();
        let file;
        let mut args = vec!["install", "--quiet"];
        match requirements {
            PipRequirements::File(path) => {
                file = path.to_string_lossy().into_owned();
                args.extend(["-r", file.as_str()]);
            }
            PipRequirements::Packages(packages) => {
                if packages.is_empty() {
                    return Ok(());
                }
                args.extend(packages.iter().map(String::as_str));
            }
        }
        let output = self
            .runner
            .run_with_timeout(&pip, &args, LONG_CMD_TIMEOUT)
            .await
            .context("pip install")?;
        ensure_success("pip install", output)?;
        Ok(())
    }
}
