//! Release download — fetches a binary over HTTPS and installs it.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::application::ports::{BinaryInstaller, CommandRunner};
use crate::infra::command_runner::{LONG_CMD_TIMEOUT, elevated, ensure_success};

/// Upper bound on a downloaded binary.
const MAX_DOWNLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Downloads with `ureq`, then places the file with `install -m 0755`.
pub struct ReleaseInstaller<R: CommandRunner> {
    runner: R,
    elevate: bool,
    agent: ureq::Agent,
}

impl<R: CommandRunner> ReleaseInstaller<R> {
    /// Downloads are bounded by [`LONG_CMD_TIMEOUT`], like package installs.
    pub fn new(runner: R, elevate: bool) -> Self {
        Self::with_timeout(runner, elevate, LONG_CMD_TIMEOUT)
    }

    pub fn with_timeout(runner: R, elevate: bool, timeout: Duration) -> Self {
        Self {
            runner,
            elevate,
            agent: agent(timeout),
        }
    }
}

/// Agent whose connect, read and overall deadline is `timeout`.
fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent("pitunnel")
        .build()
}

impl<R: CommandRunner> BinaryInstaller for ReleaseInstaller<R> {
    async fn install_binary(&self, url: &str, dest: &Path) -> Result<()> {
        let url_owned = url.to_string();
        let agent = self.agent.clone();
        let staged = tokio::task::spawn_blocking(move || download(&agent, &url_owned))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))??;

        let src = staged.path().to_string_lossy().into_owned();
        let dest = dest.to_string_lossy();
        let (program, args) = elevated(
            self.elevate,
            "install",
            &["-m", "0755", src.as_str(), dest.as_ref()],
        );
        let output = self
            .runner
            .run_with_timeout(program, &args, LONG_CMD_TIMEOUT)
            .await
            .with_context(|| format!("installing {dest}"))?;
        ensure_success("install", output)?;
        Ok(())
    }
}

/// Stream `url` into a temp file that is removed when dropped.
fn download(agent: &ureq::Agent, url: &str) -> Result<NamedTempFile> {
    tracing::debug!(url, "downloading");
    let response = match agent.get(url).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, _)) => anyhow::bail!("download failed: HTTP {code} from {url}"),
        Err(e) => return Err(anyhow::Error::new(e).context(format!("downloading {url}"))),
    };

    let mut file = NamedTempFile::new().context("creating temp file")?;
    let copied = std::io::copy(
        &mut response.into_reader().take(MAX_DOWNLOAD_BYTES),
        file.as_file_mut(),
    )
    .context("reading download")?;
    if copied == 0 {
        anyhow::bail!("download from {url} was empty");
    }
    file.as_file_mut().flush().context("flushing download")?;
    tracing::debug!(bytes = copied, "download complete");
    Ok(file)
}
