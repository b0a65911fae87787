//! `cloudflared` CLI adapter for the `TunnelProvider` port.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, TunnelProvider};
use crate::domain::TunnelRecord;
use crate::domain::tunnel::parse_tunnel_list;
use crate::infra::command_runner::ensure_success;

/// Routes every tunnel operation through the installed `cloudflared` binary.
///
/// Account-scoped subcommands receive `--origincert` explicitly so the
/// adapter never depends on cloudflared's own config discovery.
pub struct CloudflaredCli<R: CommandRunner> {
    runner: R,
    bin: String,
    origin_cert: PathBuf,
    login_cert: Option<PathBuf>,
}

impl<R: CommandRunner> CloudflaredCli<R> {
    pub fn new(runner: R, bin: &Path, origin_cert: PathBuf) -> Self {
        Self {
            runner,
            bin: bin.to_string_lossy().into_owned(),
            origin_cert,
            login_cert: dirs::home_dir().map(|home| home.join(".cloudflared").join("cert.pem")),
        }
    }

    async fn tunnel_cmd(&self, args: &[&str]) -> Result<Output> {
        let cert = self.origin_cert.to_string_lossy();
        let mut argv = vec!["tunnel", "--origincert", cert.as_ref()];
        argv.extend_from_slice(args);
        self.runner
            .run(&self.bin, &argv)
            .await
            .with_context(|| format!("cloudflared tunnel {}", args.first().unwrap_or(&"")))
    }
}

impl<R: CommandRunner> TunnelProvider for CloudflaredCli<R> {
    async fn version(&self) -> Result<Option<String>> {
        match self.runner.run(&self.bin, &["--version"]).await {
            Ok(out) if out.status.success() => {
                Ok(Some(String::from_utf8_lossy(&out.stdout).trim().to_string()))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "cloudflared not runnable");
                Ok(None)
            }
        }
    }

    async fn login(&self) -> Result<ExitStatus> {
        self.runner
            .run_status(&self.bin, &["tunnel", "login"])
            .await
            .context("cloudflared tunnel login")
    }

    fn login_cert_path(&self) -> Option<PathBuf> {
        self.login_cert.clone()
    }

    async fn list_tunnels(&self) -> Result<Vec<TunnelRecord>> {
        let output = ensure_success(
            "cloudflared tunnel list",
            self.tunnel_cmd(&["list", "--output", "json"]).await?,
        )?;
        parse_tunnel_list(&String::from_utf8_lossy(&output.stdout))
    }

    async fn create_tunnel(&self, name: &str) -> Result<Output> {
        self.tunnel_cmd(&["create", name]).await
    }

    async fn route_dns(&self, tunnel: &str, hostname: &str) -> Result<Output> {
        self.tunnel_cmd(&["route", "dns", tunnel, hostname]).await
    }

    async fn validate_ingress(&self, config_file: &Path) -> Result<Output> {
        let path = config_file.to_string_lossy();
        self.runner
            .run(&self.bin, &["tunnel", "--config", path.as_ref(), "ingress", "validate"])
            .await
            .context("cloudflared tunnel ingress validate")
    }
}
