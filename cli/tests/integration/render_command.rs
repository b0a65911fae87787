//! Integration tests for `pitunnel render`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::cli_tests::pitunnel;

const TUNNEL_ID: &str = "6FF42AE2-765D-4ADF-8112-31C55C1551EF";

fn write_config(dir: &tempfile::TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, yaml).expect("write config");
    path
}

#[test]
fn test_render_prints_all_generated_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(
        &dir,
        "domain: lab.net\nsubdomain: weather\nserver_port: 9000\nos_user: sensor\n",
    );

    pitunnel()
        .args(["render", "--tunnel-id", TUNNEL_ID, "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "# ==> /home/pi/.cloudflared/config.yml <==",
        ))
        .stdout(predicate::str::contains(
            "tunnel: 6ff42ae2-765d-4adf-8112-31c55c1551ef",
        ))
        .stdout(predicate::str::contains("hostname: weather.lab.net"))
        .stdout(predicate::str::contains("service: http://localhost:9000"))
        .stdout(predicate::str::contains("service: http_status:404"))
        .stdout(predicate::str::contains(
            "# ==> /etc/systemd/system/cloudflared-tunnel.service <==",
        ))
        .stdout(predicate::str::contains(
            "# ==> /etc/systemd/system/sensor-server.service <==",
        ))
        .stdout(predicate::str::contains("User=sensor"));
}

#[test]
fn test_render_defaults_to_placeholder_tunnel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, "");

    pitunnel()
        .args(["render", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tunnel: 00000000-0000-0000-0000-000000000000",
        ))
        .stdout(predicate::str::contains("hostname: sensors.example.com"));
}

#[test]
fn test_render_rejects_non_uuid_tunnel_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, "");

    pitunnel()
        .args(["render", "--tunnel-id", "sensor-api", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("expected a UUID"));
}

#[test]
fn test_render_honours_config_env_var() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, "subdomain: greenhouse\n");

    pitunnel()
        .env("PITUNNEL_CONFIG", &config)
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostname: greenhouse.example.com"));
}

/// A logged-in host: origin certificate in `config_dir` and a stub
/// `cloudflared` that lists one tunnel.
#[cfg(unix)]
#[test]
fn test_render_looks_up_registered_tunnel() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().display().to_string();
    std::fs::write(dir.path().join("cert.pem"), "pem").expect("write cert");
    let bin = dir.path().join("cloudflared");
    std::fs::write(
        &bin,
        "#!/bin/sh\necho '[{\"id\":\"6FF42AE2-765D-4ADF-8112-31C55C1551EF\",\"name\":\"sensor-api\"}]'\n",
    )
    .expect("write stub");
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    let config = write_config(
        &dir,
        &format!("config_dir: {root}\ncloudflared_bin: {root}/cloudflared\n"),
    );

    pitunnel()
        .args(["render", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tunnel: 6ff42ae2-765d-4adf-8112-31c55c1551ef",
        ))
        .stdout(predicate::str::contains(format!(
            "credentials-file: {root}/6ff42ae2-765d-4adf-8112-31c55c1551ef.json"
        )));
}
