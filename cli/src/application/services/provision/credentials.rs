//! Stage 3 — Cloudflare origin certificate.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, TunnelProvider, UserPrompt};
use crate::domain::{ProvisionConfig, ProvisionError, StageOutcome};

/// Ensure the origin certificate exists at `config.cert_path()`.
///
/// cloudflared's login writes the certificate under the invoking user's
/// home. When that is not `config_dir` the certificate is copied over, both
/// for one left by an earlier login and for one the login just produced.
///
/// # Errors
///
/// Returns an error if the operator declines, the login fails, or the
/// certificate is still missing afterwards.
pub async fn ensure(
    tunnel: &impl TunnelProvider,
    fs: &impl LocalFs,
    prompt: &impl UserPrompt,
    config: &ProvisionConfig,
) -> Result<StageOutcome> {
    let cert = config.cert_path();
    if fs.exists(&cert) {
        return Ok(StageOutcome::Skipped(format!(
            "credential present at {}",
            cert.display()
        )));
    }
    let login_cert = tunnel.login_cert_path().filter(|p| *p != cert);
    if let Some(from) = login_cert.as_deref().filter(|p| fs.exists(p)) {
        adopt(fs, from, config)?;
        return Ok(StageOutcome::Done(format!(
            "copied credential from {}",
            from.display()
        )));
    }

    if !prompt.confirm(
        "No Cloudflare credential found. Open the browser login now?",
        true,
    )? {
        return Err(ProvisionError::LoginDeclined.into());
    }

    let status = tunnel.login().await.context("running cloudflared login")?;
    if !status.success() {
        tracing::warn!(%status, "cloudflared login exited unsuccessfully");
    }

    if !fs.exists(&cert) {
        match login_cert.as_deref().filter(|p| fs.exists(p)) {
            Some(from) => adopt(fs, from, config)?,
            None => return Err(ProvisionError::MissingCredentials(cert).into()),
        }
    }
    Ok(StageOutcome::Done(format!("authorized, credential at {}", cert.display())))
}

/// Copy the login certificate into `config_dir`.
fn adopt(fs: &impl LocalFs, from: &Path, config: &ProvisionConfig) -> Result<()> {
    let cert = config.cert_path();
    tracing::debug!(from = %from.display(), to = %cert.display(), "copying origin certificate");
    let pem = fs.read_to_string(from)?;
    fs.create_dir_all(&config.config_dir)?;
    fs.write(&cert, &pem)
        .with_context(|| format!("copying credential to {}", cert.display()))
}
