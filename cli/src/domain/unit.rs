//! systemd unit generation — pure functions, no I/O, no async.
//!
//! [`SystemdUnit`] holds typed sections; [`SystemdUnit::render`] refuses
//! values that would corrupt the unit file instead of writing them through.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::config::ProvisionConfig;
use crate::domain::error::RenderError;

/// A `Type=simple` service unit with an always-restart policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemdUnit {
    /// Unit name without the `.service` suffix.
    pub name: String,
    pub description: String,
    pub after: Vec<String>,
    pub wants: Vec<String>,
    pub user: String,
    pub working_directory: PathBuf,
    /// Sorted so output is deterministic.
    pub environment: BTreeMap<String, String>,
    /// `ExecStart` argv; element 0 is the absolute program path.
    pub exec_start: Vec<String>,
    pub restart_sec: u32,
}

impl SystemdUnit {
    /// The cloudflared daemon running the named tunnel with the rendered ingress.
    #[must_use]
    pub fn tunnel_daemon(config: &ProvisionConfig) -> Self {
        Self {
            name: config.tunnel_service.clone(),
            description: format!("Cloudflare Tunnel {} for {}", config.tunnel_name, config.hostname()),
            after: vec!["network-online.target".into()],
            wants: vec!["network-online.target".into()],
            user: config.os_user.clone(),
            working_directory: config.config_dir.clone(),
            environment: BTreeMap::from([("NO_AUTOUPDATE".to_string(), "true".to_string())]),
            exec_start: vec![
                path_arg(&config.cloudflared_bin),
                "--no-autoupdate".into(),
                "--config".into(),
                path_arg(&config.ingress_path()),
                "tunnel".into(),
                "run".into(),
                config.tunnel_name.clone(),
            ],
            restart_sec: config.restart_sec,
        }
    }

    /// The sensor application served by uvicorn from the venv.
    #[must_use]
    pub fn app_server(config: &ProvisionConfig) -> Self {
        let module = config
            .app_entrypoint
            .strip_suffix(".py")
            .unwrap_or(&config.app_entrypoint);
        let venv_bin = config.venv_dir.join("bin");
        Self {
            name: config.app_service.clone(),
            description: format!("Sensor API server on port {}", config.server_port),
            after: vec!["network.target".into()],
            wants: Vec::new(),
            user: config.os_user.clone(),
            working_directory: config.work_dir.clone(),
            environment: BTreeMap::from([
                (
                    "PATH".to_string(),
                    format!("{}:/usr/local/bin:/usr/bin:/bin", venv_bin.display()),
                ),
                ("PORT".to_string(), config.server_port.to_string()),
                ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
            ]),
            exec_start: vec![
                path_arg(&venv_bin.join("uvicorn")),
                format!("{module}:app"),
                "--host".into(),
                "0.0.0.0".into(),
                "--port".into(),
                config.server_port.to_string(),
            ],
            restart_sec: config.restart_sec,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Render the unit file.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` if any value is empty where systemd requires
    /// one, or contains a line break.
    pub fn render(&self) -> Result<String, RenderError> {
        self.check()?;

        let mut out = String::new();
        out.push_str("# Generated by pitunnel - DO NOT EDIT\n");
        out.push_str("[Unit]\n");
        push_kv(&mut out, "Description", &self.description);
        if !self.after.is_empty() {
            push_kv(&mut out, "After", &self.after.join(" "));
        }
        if !self.wants.is_empty() {
            push_kv(&mut out, "Wants", &self.wants.join(" "));
        }
        out.push('\n');
        out.push_str("[Service]\n");
        out.push_str("Type=simple\n");
        push_kv(&mut out, "User", &self.user);
        push_kv(&mut out, "WorkingDirectory", &self.working_directory.display().to_string());
        for (k, v) in &self.environment {
            push_kv(&mut out, "Environment", &quote(&format!("{k}={v}")));
        }
        let argv: Vec<String> = self.exec_start.iter().map(|a| quote(a)).collect();
        push_kv(&mut out, "ExecStart", &argv.join(" "));
        out.push_str("Restart=always\n");
        push_kv(&mut out, "RestartSec", &self.restart_sec.to_string());
        out.push('\n');
        out.push_str("[Install]\n");
        out.push_str("WantedBy=multi-user.target\n");
        Ok(out)
    }

    fn check(&self) -> Result<(), RenderError> {
        let empty = |field| RenderError::Empty {
            unit: self.name.clone(),
            field,
        };
        if self.name.is_empty() {
            return Err(empty("name"));
        }
        if self.user.is_empty() {
            return Err(empty("User"));
        }
        if self.exec_start.first().is_none_or(String::is_empty) {
            return Err(empty("ExecStart"));
        }

        let mut fields: Vec<(String, &str)> = vec![
            ("Description".into(), self.description.as_str()),
            ("User".into(), self.user.as_str()),
        ];
        let wd = self.working_directory.to_str().unwrap_or_default();
        fields.push(("WorkingDirectory".into(), wd));
        fields.extend(self.environment.iter().flat_map(|(k, v)| {
            [
                (format!("Environment {k}"), k.as_str()),
                (format!("Environment {k}"), v.as_str()),
            ]
        }));
        fields.extend(
            self.exec_start
                .iter()
                .map(|a| ("ExecStart".to_string(), a.as_str())),
        );
        fields.extend(self.after.iter().map(|a| ("After".to_string(), a.as_str())));
        fields.extend(self.wants.iter().map(|a| ("Wants".to_string(), a.as_str())));

        match fields.into_iter().find(|(_, v)| v.contains(['\n', '\r'])) {
            Some((field, _)) => Err(RenderError::LineBreak {
                unit: self.name.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

fn push_kv(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    out.push_str(value);
    out.push('\n');
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Double-quote a value when systemd would otherwise split it.
fn quote(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '\t', '"', '\\']) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// State reported by `systemctl is-active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Activating,
    Inactive,
    Failed,
    Other(String),
}

impl ServiceState {
    #[must_use]
    pub fn parse(output: &str) -> Self {
        match output.trim() {
            "active" => Self::Active,
            "activating" | "reloading" => Self::Activating,
            "inactive" => Self::Inactive,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Activating => f.write_str("activating"),
            Self::Inactive => f.write_str("inactive"),
            Self::Failed => f.write_str("failed"),
            Self::Other(s) if s.is_empty() => f.write_str("unknown"),
            Self::Other(s) => f.write_str(s),
        }
    }
}
