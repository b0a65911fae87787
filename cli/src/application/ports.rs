//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{HttpResponse, ProvisionConfig, ServiceState, TunnelRecord};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    /// No timeout — used for interactive flows such as `cloudflared tunnel login`.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// OS-level inspection and package management.
#[allow(async_fn_in_trait)]
pub trait HostSystem {
    /// Machine hardware name, as printed by `uname -m`.
    async fn machine(&self) -> Result<String>;
    /// Whether an OS package is installed.
    async fn is_installed(&self, package: &str) -> Result<bool>;
    /// Install OS packages. Fails if the package manager fails.
    async fn install(&self, packages: &[&str]) -> Result<()>;
}

/// What to feed `pip install`.
#[derive(Debug, Clone, Copy)]
pub enum PipRequirements<'a> {
    File(&'a Path),
    Packages(&'a [String]),
}

/// Python virtual-environment tooling.
#[allow(async_fn_in_trait)]
pub trait PythonEnv {
    /// Create a virtual environment at `venv`.
    async fn create_venv(&self, venv: &Path) -> Result<()>;
    /// Install requirements into the venv.
    async fn pip_install(&self, venv: &Path, requirements: PipRequirements<'_>) -> Result<()>;
}

/// Fetches a release binary and installs it as an executable.
#[allow(async_fn_in_trait)]
pub trait BinaryInstaller {
    async fn install_binary(&self, url: &str, dest: &Path) -> Result<()>;
}

// ── Tunnel Provider Port ──────────────────────────────────────────────────────

/// Cloudflare Tunnel operations, as exposed by the `cloudflared` CLI.
#[allow(async_fn_in_trait)]
pub trait TunnelProvider {
    /// Installed binary version, or `None` if the binary is missing or broken.
    async fn version(&self) -> Result<Option<String>>;
    /// Interactive browser authorization. Blocks until the flow ends.
    async fn login(&self) -> Result<std::process::ExitStatus>;
    /// Where `login` leaves the origin certificate. cloudflared always writes
    /// it under the invoking user's home, whatever the configured directory.
    fn login_cert_path(&self) -> Option<PathBuf> {
        None
    }
    /// All tunnels visible to the origin certificate.
    async fn list_tunnels(&self) -> Result<Vec<TunnelRecord>>;
    /// Create a tunnel. cloudflared writes `<id>.json` next to the origin
    /// certificate. Returns raw output.
    async fn create_tunnel(&self, name: &str) -> Result<Output>;
    /// Point `hostname` at the tunnel with a proxied CNAME.
    async fn route_dns(&self, tunnel: &str, hostname: &str) -> Result<Output>;
    /// Validate an ingress configuration file.
    async fn validate_ingress(&self, config_file: &Path) -> Result<Output>;
}

// ── Service Manager Port ──────────────────────────────────────────────────────

/// systemd operations.
#[allow(async_fn_in_trait)]
pub trait ServiceManager {
    /// Write a unit file (privileged location).
    async fn install_unit(&self, path: &Path, content: &str) -> Result<()>;
    async fn daemon_reload(&self) -> Result<()>;
    async fn enable(&self, unit: &str) -> Result<()>;
    /// Restart the unit, starting it if it is not running.
    async fn restart(&self, unit: &str) -> Result<()>;
    async fn state(&self, unit: &str) -> Result<ServiceState>;
}

// ── Health Port ───────────────────────────────────────────────────────────────

/// Single HTTP GET against a health endpoint.
#[allow(async_fn_in_trait)]
pub trait HealthProbe {
    /// Returns the status and body for any HTTP answer; `Err` only when no
    /// answer was received (connection refused, DNS failure, timeout).
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Begin an open-ended wait such as health polling. The next `success`
    /// or `warn` ends it.
    fn wait(&self, message: &str) {
        self.step(message);
    }
}

/// Asks the operator a yes/no question.
pub trait UserPrompt {
    /// Returns `default` without asking when running non-interactively.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

// ── Config and Filesystem Ports ───────────────────────────────────────────────

/// Loads the provisioning configuration.
pub trait ConfigStore {
    /// Load the config, falling back to defaults when no file exists.
    fn load(&self) -> Result<ProvisionConfig>;
    /// Path the config is read from.
    fn path(&self) -> Result<PathBuf>;
}

/// Abstracts local filesystem access.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
}
