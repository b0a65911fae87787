//! Pipeline scenarios against the in-memory Pi.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use pitunnel_cli::application::services::provision::{ProvisionOptions, ProvisionPorts, provision};
use pitunnel_cli::domain::{ProvisionConfig, RunReport, Stage, StageFailure, StageOutcome};

use crate::mocks::{FakePi, Lines, TUNNEL_ID, quick_config};

async fn run(
    pi: &FakePi,
    config: &ProvisionConfig,
    options: ProvisionOptions,
) -> Result<RunReport, StageFailure> {
    let ports = ProvisionPorts {
        host: pi,
        python: pi,
        binaries: pi,
        tunnel: pi,
        services: pi,
        fs: pi,
        probe: pi,
        prompt: pi,
    };
    provision(&ports, config, &Lines::default(), options).await
}

fn healthy(pi: &FakePi, config: &ProvisionConfig) {
    pi.answer(&config.local_health_url(), vec![None, None, Some(200)]);
    pi.answer(&config.public_health_url(), vec![Some(200)]);
}

#[tokio::test]
async fn fresh_host_end_to_end() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);
    healthy(&pi, &config);

    let report = run(&pi, &config, ProvisionOptions::default()).await.unwrap();

    let stages: Vec<Stage> = report.stages.iter().map(|(s, _)| *s).collect();
    assert_eq!(stages, Stage::ALL.to_vec());
    assert_eq!(report.tunnel_id.as_deref(), Some(TUNNEL_ID));
    assert!(report.tunnel_created);

    assert_eq!(pi.count("cloudflared tunnel create"), 1);
    assert_eq!(pi.count("cloudflared tunnel login"), 1);
    assert!(pi.log().iter().any(|c| c.ends_with("/cloudflared-linux-arm64")));

    let ingress = pi.file(&config.ingress_path()).unwrap();
    assert!(ingress.contains(&format!("tunnel: {TUNNEL_ID}")));
    assert!(ingress.contains("service: http://localhost:8000"));

    assert_eq!(pi.count("tee "), 2);
    assert_eq!(pi.count("systemctl restart"), 2);
    assert!(
        pi.file(&config.unit_path("sensor-server"))
            .unwrap()
            .contains("Restart=always")
    );

    assert_eq!(pi.count("GET http://localhost:8000/health"), 3);
    assert!(matches!(
        report.outcome(Stage::Verification),
        Some(StageOutcome::Done(_))
    ));
}

#[tokio::test]
async fn second_run_reuses_everything() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);
    healthy(&pi, &config);
    run(&pi, &config, ProvisionOptions::default()).await.unwrap();

    pi.clear_log();
    let report = run(&pi, &config, ProvisionOptions { skip_verify: true })
        .await
        .unwrap();

    assert_eq!(pi.count("cloudflared tunnel list"), 1);
    assert_eq!(pi.count("cloudflared tunnel create"), 0);
    assert_eq!(pi.count("cloudflared tunnel login"), 0);
    assert_eq!(pi.count("python3 -m venv"), 0);
    assert_eq!(pi.count("apt-get"), 0);
    assert_eq!(pi.count("download"), 0);
    assert_eq!(pi.count("tee "), 0);
    assert_eq!(pi.count("systemctl daemon-reload"), 0);
    assert_eq!(pi.count("systemctl restart"), 2);

    assert!(!report.tunnel_created);
    assert_eq!(report.tunnel_id.as_deref(), Some(TUNNEL_ID));
    assert!(matches!(
        report.outcome(Stage::Tunnel),
        Some(StageOutcome::Skipped(_))
    ));
}

#[tokio::test]
async fn unsupported_architecture_aborts_before_any_action() {
    let config = quick_config();
    let mut pi = FakePi::fresh(&config);
    pi.machine = "mips".to_string();

    let failure = run(&pi, &config, ProvisionOptions::default())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Dependencies);
    assert!(failure.to_string().starts_with("stage 1 (dependency install) failed"));
    assert!(failure.to_string().contains("mips"));
    assert_eq!(pi.log(), vec!["uname -m".to_string()]);
}

#[tokio::test]
async fn missing_credential_after_login_aborts_before_registration() {
    let config = quick_config();
    let mut pi = FakePi::fresh(&config);
    pi.login_writes_cert = false;

    let failure = run(&pi, &config, ProvisionOptions::default())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Credentials);
    assert!(
        failure
            .to_string()
            .starts_with("stage 3 (secret acquisition) failed: Cloudflare credential not found")
    );
    assert_eq!(pi.count("cloudflared tunnel list"), 0);
    assert_eq!(pi.count("cloudflared tunnel create"), 0);
}

#[tokio::test]
async fn declined_login_aborts_without_running_login() {
    let config = quick_config();
    let mut pi = FakePi::fresh(&config);
    pi.consent = false;

    let failure = run(&pi, &config, ProvisionOptions::default())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Credentials);
    assert_eq!(pi.count("cloudflared tunnel login"), 0);
}

#[tokio::test]
async fn validation_failure_touches_no_service() {
    let config = quick_config();
    let mut pi = FakePi::fresh(&config);
    pi.ingress_valid = false;

    let failure = run(&pi, &config, ProvisionOptions::default())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::ConfigValidation);
    assert!(failure.to_string().contains("unknown service scheme"));
    assert_eq!(pi.count("tee "), 0);
    assert_eq!(pi.count("systemctl"), 0);
    // The tunnel created earlier is left in place for the next run.
    assert_eq!(pi.tunnels.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_entrypoint_stops_at_workspace() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);
    pi.files.lock().unwrap().remove(&config.entrypoint_path());

    let failure = run(&pi, &config, ProvisionOptions::default())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Workspace);
    assert!(failure.to_string().contains("server.py"));
    assert_eq!(pi.count("cloudflared tunnel"), 0);
}

#[tokio::test]
async fn unreachable_public_route_is_only_a_warning() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);
    pi.answer(&config.local_health_url(), vec![Some(200)]);

    let report = run(&pi, &config, ProvisionOptions::default()).await.unwrap();

    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, Stage::Verification);
    assert!(warnings[0].1.contains("public unreachable"), "{}", warnings[0].1);
    assert_eq!(pi.count("GET https://sensors.example.com/health"), 3);
}

#[tokio::test]
async fn skip_verify_never_polls_health() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);

    let report = run(&pi, &config, ProvisionOptions { skip_verify: true })
        .await
        .unwrap();

    assert_eq!(pi.count("GET"), 0);
    assert!(matches!(
        report.outcome(Stage::Verification),
        Some(StageOutcome::Skipped(_))
    ));
}

#[tokio::test]
async fn reporter_sees_one_step_and_one_result_per_stage() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);
    healthy(&pi, &config);
    let lines = Lines::default();
    let ports = ProvisionPorts {
        host: &pi,
        python: &pi,
        binaries: &pi,
        tunnel: &pi,
        services: &pi,
        fs: &pi,
        probe: &pi,
        prompt: &pi,
    };

    provision(&ports, &config, &lines, ProvisionOptions::default())
        .await
        .unwrap();

    let lines = lines.all();
    assert_eq!(lines.len(), 18);
    assert_eq!(lines[0], "step [1/9] dependency install");
    assert!(lines[1].starts_with("ok [1/9] dependency install: installed "));
    assert_eq!(lines[16], "wait [9/9] post-install verification");
}

#[tokio::test]
async fn skipped_verification_never_waits() {
    let config = quick_config();
    let pi = FakePi::fresh(&config);
    let lines = Lines::default();
    let ports = ProvisionPorts {
        host: &pi,
        python: &pi,
        binaries: &pi,
        tunnel: &pi,
        services: &pi,
        fs: &pi,
        probe: &pi,
        prompt: &pi,
    };

    provision(&ports, &config, &lines, ProvisionOptions { skip_verify: true })
        .await
        .unwrap();

    assert!(lines.all().iter().all(|l| !l.starts_with("wait ")));
}
