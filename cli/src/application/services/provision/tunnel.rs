//! Stage 4 — look up the named tunnel, creating it if absent.

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, TunnelProvider};
use crate::application::services::diagnostic;
use crate::domain::tunnel::{find_live, is_valid_tunnel_id, parse_created_id};
use crate::domain::{ProvisionConfig, ProvisionError, StageOutcome};

/// The tunnel every later stage binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelResolution {
    pub id: String,
    /// `false` when an existing tunnel was reused.
    pub created: bool,
}

impl TunnelResolution {
    #[must_use]
    pub fn outcome(&self, name: &str) -> StageOutcome {
        if self.created {
            StageOutcome::Done(format!("created tunnel {name} ({})", self.id))
        } else {
            StageOutcome::Skipped(format!("reusing tunnel {name} ({})", self.id))
        }
    }
}

/// Resolve the tunnel id for `config.tunnel_name`.
///
/// A live tunnel with that exact name is reused; otherwise one is created.
/// Either way the credentials file for the id must exist on disk.
///
/// # Errors
///
/// Returns an error if listing fails, creation fails, no valid id can be
/// determined, or the credentials file is missing.
pub async fn resolve(
    tunnel: &impl TunnelProvider,
    fs: &impl LocalFs,
    config: &ProvisionConfig,
) -> Result<TunnelResolution> {
    let name = &config.tunnel_name;
    let records = tunnel.list_tunnels().await.context("listing tunnels")?;

    let resolution = if let Some(existing) = find_live(&records, name) {
        tracing::debug!(id = %existing.id, "found existing tunnel");
        TunnelResolution {
            id: existing.id.to_ascii_lowercase(),
            created: false,
        }
    } else {
        TunnelResolution {
            id: create(tunnel, name).await?,
            created: true,
        }
    };

    if !is_valid_tunnel_id(&resolution.id) {
        return Err(ProvisionError::TunnelUnresolved {
            name: name.clone(),
            detail: format!("'{}' is not a tunnel id", resolution.id),
        }
        .into());
    }

    let credentials = config.credentials_path(&resolution.id);
    if !fs.exists(&credentials) {
        return Err(ProvisionError::MissingFile {
            what: "tunnel credentials file",
            path: credentials,
        }
        .into());
    }
    Ok(resolution)
}

/// Id of the live tunnel named `config.tunnel_name`, without creating one.
///
/// `None` when there is no origin certificate to list with, or no such tunnel.
///
/// # Errors
///
/// Returns an error if listing fails.
pub async fn lookup(
    tunnel: &impl TunnelProvider,
    fs: &impl LocalFs,
    config: &ProvisionConfig,
) -> Result<Option<String>> {
    if !fs.exists(&config.cert_path()) {
        return Ok(None);
    }
    let records = tunnel.list_tunnels().await.context("listing tunnels")?;
    Ok(find_live(&records, &config.tunnel_name).map(|r| r.id.to_ascii_lowercase()))
}

async fn create(tunnel: &impl TunnelProvider, name: &str) -> Result<String> {
    let output = tunnel
        .create_tunnel(name)
        .await
        .context("creating tunnel")?;
    if !output.status.success() {
        return Err(ProvisionError::TunnelUnresolved {
            name: name.to_string(),
            detail: diagnostic(&output),
        }
        .into());
    }

    let printed = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    if let Some(id) = parse_created_id(&printed) {
        return Ok(id);
    }

    // Output format drifted; fall back to the listing.
    tracing::debug!("tunnel id not found in create output, listing again");
    let records = tunnel
        .list_tunnels()
        .await
        .context("listing tunnels after create")?;
    find_live(&records, name)
        .map(|r| r.id.to_ascii_lowercase())
        .ok_or_else(|| {
            ProvisionError::TunnelUnresolved {
                name: name.to_string(),
                detail: "created, but not visible in the tunnel list".to_string(),
            }
            .into()
        })
}
