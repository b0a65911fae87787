//! Stage 1 — OS packages and the cloudflared binary.

use anyhow::{Context, Result};

use crate::application::ports::{BinaryInstaller, HostSystem, TunnelProvider};
use crate::domain::{CloudflaredArch, ProvisionConfig, ProvisionError, StageOutcome};

/// Ensure required packages and the cloudflared binary are present.
///
/// Architecture detection runs before anything else so an unsupported host
/// aborts without touching the package manager or the network.
///
/// # Errors
///
/// Returns an error on an unsupported architecture, a package-manager
/// failure, or a cloudflared binary that still does not run after install.
pub async fn ensure(
    host: &impl HostSystem,
    binaries: &impl BinaryInstaller,
    tunnel: &impl TunnelProvider,
    config: &ProvisionConfig,
) -> Result<StageOutcome> {
    let machine = host.machine().await.context("detecting host architecture")?;
    let arch = CloudflaredArch::from_machine(&machine)?;
    tracing::debug!(machine = machine.trim(), %arch, "host architecture");

    let mut missing = Vec::new();
    for package in &config.packages {
        if !host
            .is_installed(package)
            .await
            .with_context(|| format!("querying package {package}"))?
        {
            missing.push(package.as_str());
        }
    }
    if !missing.is_empty() {
        host.install(&missing)
            .await
            .context("installing OS packages")?;
    }

    let installed_binary = if let Some(version) = tunnel.version().await? {
        tracing::debug!(%version, "cloudflared already installed");
        false
    } else {
        let url = arch.download_url();
        binaries
            .install_binary(&url, &config.cloudflared_bin)
            .await
            .with_context(|| format!("installing cloudflared from {url}"))?;
        if tunnel.version().await?.is_none() {
            return Err(ProvisionError::MissingFile {
                what: "working cloudflared binary",
                path: config.cloudflared_bin.clone(),
            }
            .into());
        }
        true
    };

    Ok(match (missing.is_empty(), installed_binary) {
        (true, false) => StageOutcome::Skipped(format!(
            "{} packages and cloudflared already present ({arch})",
            config.packages.len()
        )),
        (true, true) => StageOutcome::Done(format!("installed cloudflared-linux-{arch}")),
        (false, false) => StageOutcome::Done(format!("installed {}", missing.join(" "))),
        (false, true) => StageOutcome::Done(format!(
            "installed {} and cloudflared-linux-{arch}",
            missing.join(" ")
        )),
    })
}
