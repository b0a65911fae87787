//! `pitunnel render` — print the generated files without touching the host.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::application::services::provision::tunnel::lookup;
use crate::domain::{ConfigOverrides, IngressConfig, ProvisionConfig, SystemdUnit};
use crate::infra::cloudflared::CloudflaredCli;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::HostFs;

/// Stand-in tunnel id used when none is given and none can be looked up.
pub const PLACEHOLDER_TUNNEL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Config file [default: $PITUNNEL_CONFIG or <config dir>/pitunnel/config.yaml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Tunnel id to embed in the ingress config [default: looked up by
    /// tunnel name when logged in, else an all-zero placeholder]
    #[arg(long)]
    pub tunnel_id: Option<String>,
}

/// Entry point for `pitunnel render`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a file fails to render.
pub async fn run(args: &RenderArgs) -> Result<()> {
    let config = super::load_config(args.config.clone(), ConfigOverrides::default())?;
    let tunnel_id = match &args.tunnel_id {
        Some(id) => id.clone(),
        None => registered_id(&config).await,
    };
    print!("{}", render_all(&config, &tunnel_id)?);
    Ok(())
}

/// The registered tunnel's id, or the placeholder when it cannot be found.
async fn registered_id(config: &ProvisionConfig) -> String {
    let tunnel = CloudflaredCli::new(
        TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT),
        &config.cloudflared_bin,
        config.cert_path(),
    );
    match lookup(&tunnel, &HostFs, config).await {
        Ok(Some(id)) => id,
        Ok(None) => PLACEHOLDER_TUNNEL_ID.to_string(),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "tunnel lookup failed, using placeholder id");
            PLACEHOLDER_TUNNEL_ID.to_string()
        }
    }
}

/// Every generated file, each preceded by a `# ==> path <==` banner.
///
/// # Errors
///
/// Returns the first rendering error.
pub fn render_all(config: &ProvisionConfig, tunnel_id: &str) -> Result<String> {
    let tunnel_id = tunnel_id.to_ascii_lowercase();
    let ingress = IngressConfig::for_tunnel(config, &tunnel_id)
        .render()
        .context("rendering ingress config")?;

    let mut out = banner(&config.ingress_path().display().to_string());
    out.push_str(&ingress);
    for unit in [SystemdUnit::tunnel_daemon(config), SystemdUnit::app_server(config)] {
        let body = unit
            .render()
            .with_context(|| format!("rendering {}", unit.file_name()))?;
        out.push('\n');
        out.push_str(&banner(&config.unit_path(&unit.name).display().to_string()));
        out.push_str(&body);
    }
    Ok(out)
}

fn banner(path: &str) -> String {
    format!("# ==> {path} <==\n")
}
