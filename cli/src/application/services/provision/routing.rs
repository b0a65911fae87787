//! Stages 5–7 — ingress file, DNS route and ingress validation.

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, TunnelProvider};
use crate::application::services::diagnostic;
use crate::domain::{IngressConfig, ProvisionConfig, ProvisionError, StageOutcome};

/// Write `config.yml` for the resolved tunnel, replacing any previous file.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn materialize(
    fs: &impl LocalFs,
    config: &ProvisionConfig,
    tunnel_id: &str,
) -> Result<StageOutcome> {
    let rendered = IngressConfig::for_tunnel(config, tunnel_id).render()?;
    fs.create_dir_all(&config.config_dir)?;
    let path = config.ingress_path();
    fs.write(&path, &rendered)?;
    Ok(StageOutcome::Done(format!(
        "{} → {} ({})",
        config.hostname(),
        config.local_service_url(),
        path.display()
    )))
}

/// cloudflared answers for a hostname that already has a record.
const ALREADY_ROUTED: [&str; 2] = ["already configured", "already exists"];

/// Bind the public hostname to the tunnel.
///
/// A record that already exists for the hostname counts as success.
///
/// # Errors
///
/// Returns `DnsRouting` if the provider rejects the route.
pub async fn route_dns(
    tunnel: &impl TunnelProvider,
    config: &ProvisionConfig,
) -> Result<StageOutcome> {
    let hostname = config.hostname();
    let output = tunnel
        .route_dns(&config.tunnel_name, &hostname)
        .await
        .context("routing DNS")?;
    let detail = diagnostic(&output);
    if ALREADY_ROUTED.iter().any(|marker| detail.contains(marker)) {
        tracing::debug!(%detail, "DNS record already present");
        return Ok(StageOutcome::Skipped(format!("{hostname} already routed")));
    }
    if !output.status.success() {
        return Err(ProvisionError::DnsRouting { hostname, detail }.into());
    }
    Ok(StageOutcome::Done(format!("{hostname} → {}", config.tunnel_name)))
}

/// Ask cloudflared to validate the written ingress file.
///
/// # Errors
///
/// Returns `InvalidIngress` with the validator's report on rejection.
pub async fn validate(
    tunnel: &impl TunnelProvider,
    config: &ProvisionConfig,
) -> Result<StageOutcome> {
    let path = config.ingress_path();
    let output = tunnel
        .validate_ingress(&path)
        .await
        .context("validating ingress")?;
    if !output.status.success() {
        return Err(ProvisionError::InvalidIngress(diagnostic(&output)).into());
    }
    Ok(StageOutcome::Done(format!("{} is valid", path.display())))
}
