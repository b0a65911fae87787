//! Provisioning use-case: the nine-stage pipeline.
//!
//! Stages run strictly in [`Stage::ALL`] order. The first failing stage
//! aborts the run with a [`StageFailure`]; nothing done by earlier stages is
//! undone, and a re-run resumes through their idempotency checks.

pub mod credentials;
pub mod dependencies;
pub mod routing;
pub mod tunnel;
pub mod units;
pub mod verify;
pub mod workspace;

use std::future::Future;

use anyhow::Result;

use crate::application::ports::{
    BinaryInstaller, HealthProbe, HostSystem, LocalFs, ProgressReporter, PythonEnv,
    ServiceManager, TunnelProvider, UserPrompt,
};
use crate::domain::{ProvisionConfig, RunReport, Stage, StageFailure, StageOutcome};

/// Every collaborator the pipeline drives.
pub struct ProvisionPorts<'a, H, P, B, T, S, F, N, Q> {
    pub host: &'a H,
    pub python: &'a P,
    pub binaries: &'a B,
    pub tunnel: &'a T,
    pub services: &'a S,
    pub fs: &'a F,
    pub probe: &'a N,
    pub prompt: &'a Q,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionOptions {
    /// Record verification as skipped instead of polling.
    pub skip_verify: bool,
}

/// Run the full pipeline.
///
/// # Errors
///
/// Returns the first [`StageFailure`]; later stages never run.
pub async fn provision<H, P, B, T, S, F, N, Q>(
    ports: &ProvisionPorts<'_, H, P, B, T, S, F, N, Q>,
    config: &ProvisionConfig,
    reporter: &impl ProgressReporter,
    options: ProvisionOptions,
) -> Result<RunReport, StageFailure>
where
    H: HostSystem,
    P: PythonEnv,
    B: BinaryInstaller,
    T: TunnelProvider,
    S: ServiceManager,
    F: LocalFs,
    N: HealthProbe,
    Q: UserPrompt,
{
    let mut report = RunReport::default();

    let outcome = run_stage(
        Stage::Dependencies,
        reporter,
        dependencies::ensure(ports.host, ports.binaries, ports.tunnel, config),
    )
    .await?;
    finish(&mut report, reporter, Stage::Dependencies, outcome);

    let outcome = run_stage(
        Stage::Workspace,
        reporter,
        workspace::ensure(ports.python, ports.fs, config),
    )
    .await?;
    finish(&mut report, reporter, Stage::Workspace, outcome);

    let outcome = run_stage(
        Stage::Credentials,
        reporter,
        credentials::ensure(ports.tunnel, ports.fs, ports.prompt, config),
    )
    .await?;
    finish(&mut report, reporter, Stage::Credentials, outcome);

    let resolution = run_stage(
        Stage::Tunnel,
        reporter,
        tunnel::resolve(ports.tunnel, ports.fs, config),
    )
    .await?;
    report.tunnel_id = Some(resolution.id.clone());
    report.tunnel_created = resolution.created;
    finish(
        &mut report,
        reporter,
        Stage::Tunnel,
        resolution.outcome(&config.tunnel_name),
    );

    let outcome = run_stage(Stage::IngressConfig, reporter, async {
        routing::materialize(ports.fs, config, &resolution.id)
    })
    .await?;
    finish(&mut report, reporter, Stage::IngressConfig, outcome);

    let outcome = run_stage(
        Stage::DnsRoute,
        reporter,
        routing::route_dns(ports.tunnel, config),
    )
    .await?;
    finish(&mut report, reporter, Stage::DnsRoute, outcome);

    let outcome = run_stage(
        Stage::ConfigValidation,
        reporter,
        routing::validate(ports.tunnel, config),
    )
    .await?;
    finish(&mut report, reporter, Stage::ConfigValidation, outcome);

    let outcome = run_stage(
        Stage::Services,
        reporter,
        units::install(ports.services, ports.fs, config),
    )
    .await?;
    finish(&mut report, reporter, Stage::Services, outcome);

    let outcome = if options.skip_verify {
        StageOutcome::Skipped("--skip-verify".to_string())
    } else {
        reporter.wait(&Stage::Verification.to_string());
        verify::verify(ports.probe, config).await
    };
    finish(&mut report, reporter, Stage::Verification, outcome);

    Ok(report)
}

async fn run_stage<O>(
    stage: Stage,
    reporter: &impl ProgressReporter,
    work: impl Future<Output = Result<O>>,
) -> Result<O, StageFailure> {
    reporter.step(&stage.to_string());
    tracing::debug!(stage = stage.ordinal(), name = stage.name(), "stage started");
    work.await.map_err(|error| {
        tracing::debug!(stage = stage.ordinal(), error = %format!("{error:#}"), "stage failed");
        StageFailure { stage, error }
    })
}

fn finish(
    report: &mut RunReport,
    reporter: &impl ProgressReporter,
    stage: Stage,
    outcome: StageOutcome,
) {
    let line = format!("{stage}: {}", outcome.detail());
    match &outcome {
        StageOutcome::Done(_) | StageOutcome::Skipped(_) => reporter.success(&line),
        StageOutcome::Warned(_) => reporter.warn(&line),
    }
    report.record(stage, outcome);
}
