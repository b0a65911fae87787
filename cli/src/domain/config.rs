//! Domain types and validators for the provisioning configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// Provisioning configuration, immutable for the duration of a run.
///
/// Every field has a compiled-in default, so an empty YAML document (or no
/// file at all) yields the stock Raspberry Pi sensor-server setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Apex domain of the public hostname, e.g. `example.com`.
    pub domain: String,
    /// Left-most label of the public hostname, e.g. `sensors`.
    pub subdomain: String,
    /// Tunnel name registered with Cloudflare.
    pub tunnel_name: String,
    /// Local port the application server listens on.
    pub server_port: u16,
    /// Account both services run as.
    pub os_user: String,
    /// Application directory containing the entrypoint.
    pub work_dir: PathBuf,
    /// cloudflared credential and ingress directory.
    pub config_dir: PathBuf,
    /// Python virtual environment location.
    pub venv_dir: PathBuf,
    /// OS packages the host must carry.
    pub packages: Vec<String>,
    /// pip packages, used when `work_dir/requirements.txt` is absent.
    pub python_packages: Vec<String>,
    /// Application file inside `work_dir`.
    pub app_entrypoint: String,
    /// Install location of the cloudflared binary.
    pub cloudflared_bin: PathBuf,
    /// Directory systemd unit files are written to.
    pub unit_dir: PathBuf,
    /// Unit name of the tunnel daemon.
    pub tunnel_service: String,
    /// Unit name of the application server.
    pub app_service: String,
    /// Fixed restart backoff for both units, in seconds.
    pub restart_sec: u32,
    /// Prefix privileged commands with `sudo`.
    pub elevate: bool,
    /// Post-install health polling budget.
    pub verify: VerifyConfig,
}

/// Health polling budget for post-install verification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifyConfig {
    pub local_attempts: u32,
    pub local_interval_secs: u64,
    pub public_attempts: u32,
    pub public_interval_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            local_attempts: 15,
            local_interval_secs: 2,
            public_attempts: 6,
            public_interval_secs: 10,
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        let home = PathBuf::from("/home/pi");
        let work_dir = home.join("sensor-server");
        Self {
            domain: "example.com".to_string(),
            subdomain: "sensors".to_string(),
            tunnel_name: "sensor-api".to_string(),
            server_port: 8000,
            os_user: "pi".to_string(),
            venv_dir: work_dir.join("venv"),
            work_dir,
            config_dir: home.join(".cloudflared"),
            packages: ["python3", "python3-venv", "python3-pip", "python3-dev", "wget", "curl"]
                .map(str::to_string)
                .to_vec(),
            python_packages: ["fastapi", "uvicorn", "pydantic", "RPi.GPIO", "Adafruit_DHT"]
                .map(str::to_string)
                .to_vec(),
            app_entrypoint: "server.py".to_string(),
            cloudflared_bin: PathBuf::from("/usr/local/bin/cloudflared"),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            tunnel_service: "cloudflared-tunnel".to_string(),
            app_service: "sensor-server".to_string(),
            restart_sec: 5,
            elevate: true,
            verify: VerifyConfig::default(),
        }
    }
}

/// Command-line overrides layered on top of the file configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    pub tunnel_name: Option<String>,
    pub server_port: Option<u16>,
    pub os_user: Option<String>,
}

impl ProvisionConfig {
    /// Apply non-empty overrides, consuming `self`.
    ///
    /// A new `os_user` also moves `work_dir`, `config_dir` and `venv_dir`
    /// when they live under the previous user's `/home/<user>`. Paths
    /// elsewhere are left as configured.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.domain {
            self.domain = v;
        }
        if let Some(v) = overrides.subdomain {
            self.subdomain = v;
        }
        if let Some(v) = overrides.tunnel_name {
            self.tunnel_name = v;
        }
        if let Some(v) = overrides.server_port {
            self.server_port = v;
        }
        if let Some(user) = overrides.os_user {
            let old_home = Path::new("/home").join(&self.os_user);
            let new_home = Path::new("/home").join(&user);
            for dir in [&mut self.work_dir, &mut self.config_dir, &mut self.venv_dir] {
                if let Ok(rest) = dir.strip_prefix(&old_home) {
                    *dir = new_home.join(rest);
                }
            }
            self.os_user = user;
        }
        self
    }

    /// Public hostname, `{subdomain}.{domain}`.
    #[must_use]
    pub fn hostname(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }

    /// Origin certificate written by `cloudflared tunnel login`.
    #[must_use]
    pub fn cert_path(&self) -> PathBuf {
        self.config_dir.join("cert.pem")
    }

    /// Tunnel credentials file for the given tunnel id.
    #[must_use]
    pub fn credentials_path(&self, tunnel_id: &str) -> PathBuf {
        self.config_dir.join(format!("{tunnel_id}.json"))
    }

    /// Rendered ingress configuration.
    #[must_use]
    pub fn ingress_path(&self) -> PathBuf {
        self.config_dir.join("config.yml")
    }

    #[must_use]
    pub fn entrypoint_path(&self) -> PathBuf {
        self.work_dir.join(&self.app_entrypoint)
    }

    #[must_use]
    pub fn requirements_path(&self) -> PathBuf {
        self.work_dir.join("requirements.txt")
    }

    /// Python interpreter inside the venv; its presence marks the venv as created.
    #[must_use]
    pub fn venv_python(&self) -> PathBuf {
        self.venv_dir.join("bin").join("python")
    }

    #[must_use]
    pub fn local_service_url(&self) -> String {
        format!("http://localhost:{}", self.server_port)
    }

    #[must_use]
    pub fn local_health_url(&self) -> String {
        format!("{}/health", self.local_service_url())
    }

    #[must_use]
    pub fn public_health_url(&self) -> String {
        format!("https://{}/health", self.hostname())
    }

    #[must_use]
    pub fn unit_path(&self, service: &str) -> PathBuf {
        self.unit_dir.join(format!("{service}.service"))
    }

    /// Validate every field that ends up in a command line or generated file.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dns_name("domain", &self.domain)?;
        validate_dns_label("subdomain", &self.subdomain)?;
        validate_identifier("tunnel_name", &self.tunnel_name)?;
        validate_identifier("os_user", &self.os_user)?;
        validate_identifier("tunnel_service", &self.tunnel_service)?;
        validate_identifier("app_service", &self.app_service)?;
        if self.tunnel_service == self.app_service {
            return Err(invalid("app_service", "must differ from tunnel_service"));
        }
        if self.server_port == 0 {
            return Err(invalid("server_port", "must be between 1 and 65535"));
        }
        for (field, path) in [
            ("work_dir", &self.work_dir),
            ("config_dir", &self.config_dir),
            ("venv_dir", &self.venv_dir),
            ("cloudflared_bin", &self.cloudflared_bin),
            ("unit_dir", &self.unit_dir),
        ] {
            validate_absolute(field, path)?;
        }
        if !self.app_entrypoint.ends_with(".py") || self.app_entrypoint.contains('/') {
            return Err(invalid(
                "app_entrypoint",
                "must be a .py file name inside work_dir",
            ));
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn validate_dns_label(field: &'static str, label: &str) -> Result<(), ConfigError> {
    if label.is_empty() || label.len() > 63 {
        return Err(invalid(field, "label must be 1-63 characters"));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            field,
            format!("'{label}' may only contain a-z, 0-9 and '-'"),
        ));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(invalid(
            field,
            format!("'{label}' must not start or end with '-'"),
        ));
    }
    Ok(())
}

fn validate_dns_name(field: &'static str, name: &str) -> Result<(), ConfigError> {
    if !name.contains('.') {
        return Err(invalid(field, format!("'{name}' is not a fully qualified domain")));
    }
    name.split('.')
        .try_for_each(|label| validate_dns_label(field, label))
}

fn validate_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(invalid(
            field,
            format!("'{value}' must not contain whitespace or '/'"),
        ));
    }
    Ok(())
}

fn validate_absolute(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("'{}' must be an absolute path", path.display()),
        ))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
