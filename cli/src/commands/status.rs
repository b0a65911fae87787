//! `pitunnel status` — service states and one-shot endpoint health.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::status::{StatusReport, collect, verification_commands};
use crate::domain::{ConfigOverrides, HealthStatus, ProvisionConfig};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::http::UreqProbe;
use crate::infra::systemd::Systemctl;
use crate::output::{OutputContext, progress};

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Config file [default: $PITUNNEL_CONFIG or <config dir>/pitunnel/config.yaml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Entry point for `pitunnel status`.
///
/// Unhealthy endpoints are reported, not treated as errors.
///
/// # Errors
///
/// Returns an error only if the configuration cannot be loaded.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<()> {
    let config = super::load_config(args.config.clone(), ConfigOverrides::default())?;
    let ctx = &app.output;

    // is-active needs no privileges.
    let services = Systemctl::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT), false);
    let probe = UreqProbe::new(Duration::from_secs(5));

    let spinner = ctx
        .show_progress()
        .then(|| progress::spinner(&format!("Checking {}", config.hostname())));
    let report = collect(&services, &probe, &config).await;
    if let Some(pb) = &spinner {
        progress::finish_clear(pb);
    }

    print_report(ctx, &config, &report);
    Ok(())
}

fn print_report(ctx: &OutputContext, config: &ProvisionConfig, report: &StatusReport) {
    ctx.header("Services");
    for (unit, state) in &report.services {
        ctx.service(unit, state);
    }

    ctx.header("Endpoints");
    health_line(ctx, &config.local_health_url(), &report.local);
    health_line(ctx, &config.public_health_url(), &report.public);

    if !report.all_healthy() {
        ctx.header("Investigate with");
        for cmd in verification_commands(config) {
            ctx.command(&cmd);
        }
    }
}

fn health_line(ctx: &OutputContext, url: &str, status: &HealthStatus) {
    let line = format!("{url}: {status}");
    if status.is_healthy() {
        ctx.success(&line);
    } else {
        ctx.warn(&line);
    }
}
