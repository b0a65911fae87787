//! `pitunnel provision` — run the nine-stage pipeline against this host.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ServiceManager;
use crate::application::services::provision::{ProvisionOptions, ProvisionPorts, provision};
use crate::application::services::status::verification_commands;
use crate::domain::{
    ConfigOverrides, ProvisionConfig, RunReport, ServiceState, Stage, StageOutcome,
};
use crate::infra::cloudflared::CloudflaredCli;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::HostFs;
use crate::infra::host::DebianHost;
use crate::infra::http::UreqProbe;
use crate::infra::python::VenvTool;
use crate::infra::release::ReleaseInstaller;
use crate::infra::systemd::Systemctl;
use crate::output::{OutputContext, TerminalReporter};

/// Per-request timeout of a single health probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Config file [default: $PITUNNEL_CONFIG or <config dir>/pitunnel/config.yaml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer yes to prompts (also set by CI / PITUNNEL_YES)
    #[arg(short, long)]
    pub yes: bool,

    /// Apex domain, e.g. example.com
    #[arg(long)]
    pub domain: Option<String>,

    /// Left-most hostname label, e.g. sensors
    #[arg(long)]
    pub subdomain: Option<String>,

    /// Cloudflare tunnel name
    #[arg(long)]
    pub tunnel_name: Option<String>,

    /// Local port of the application server
    #[arg(long)]
    pub port: Option<u16>,

    /// Account both services run as; paths under /home/<user> follow it
    #[arg(long)]
    pub user: Option<String>,

    /// Do not poll the health endpoints after starting services
    #[arg(long)]
    pub skip_verify: bool,
}

impl ProvisionArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            domain: self.domain.clone(),
            subdomain: self.subdomain.clone(),
            tunnel_name: self.tunnel_name.clone(),
            server_port: self.port,
            os_user: self.user.clone(),
        }
    }
}

/// Entry point for `pitunnel provision`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any stage fails.
pub async fn run(app: &AppContext, args: ProvisionArgs) -> Result<()> {
    let overrides = args.overrides();
    let config = super::load_config(args.config, overrides)?;
    let ctx = &app.output;

    ctx.header(&format!(
        "Provisioning {} → {}",
        config.hostname(),
        config.local_service_url()
    ));

    let runner = || TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT);
    let host = DebianHost::new(runner(), config.elevate);
    let python = VenvTool::new(runner());
    let binaries = ReleaseInstaller::new(runner(), config.elevate);
    let tunnel = CloudflaredCli::new(runner(), &config.cloudflared_bin, config.cert_path());
    let services = Systemctl::new(runner(), config.elevate);
    let probe = UreqProbe::new(PROBE_TIMEOUT);

    let ports = ProvisionPorts {
        host: &host,
        python: &python,
        binaries: &binaries,
        tunnel: &tunnel,
        services: &services,
        fs: &HostFs,
        probe: &probe,
        prompt: app,
    };
    let options = ProvisionOptions {
        skip_verify: args.skip_verify,
    };

    let report = match provision(&ports, &config, &TerminalReporter::new(ctx), options).await {
        Ok(report) => report,
        Err(failure) => {
            ctx.error(&failure.stage.to_string());
            return Err(failure.into());
        }
    };

    print_summary(ctx, &services, &config, &report).await;
    Ok(())
}

async fn print_summary(
    ctx: &OutputContext,
    services: &impl ServiceManager,
    config: &ProvisionConfig,
    report: &RunReport,
) {
    ctx.header("Summary");
    if let Some(id) = &report.tunnel_id {
        let how = if report.tunnel_created { "created" } else { "reused" };
        ctx.kv("tunnel", &format!("{} {id} ({how})", config.tunnel_name));
    }
    ctx.kv("hostname", &format!("https://{}", config.hostname()));

    for unit in [&config.tunnel_service, &config.app_service] {
        let state = services
            .state(unit)
            .await
            .unwrap_or_else(|_| ServiceState::Other(String::new()));
        ctx.service(unit, &state);
    }

    let warnings = report.warnings().count();
    if matches!(
        report.outcome(Stage::Verification),
        Some(StageOutcome::Skipped(_))
    ) {
        ctx.info("health not checked; run `pitunnel status` once the services are up");
    }
    if warnings > 0 {
        ctx.warn(&format!(
            "finished with {warnings} warning(s); the services keep retrying on their own"
        ));
    } else {
        ctx.success("provisioning complete");
    }

    ctx.header("Verify with");
    for cmd in verification_commands(config) {
        ctx.command(&cmd);
    }
}
