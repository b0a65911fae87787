//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Fatal conditions that abort the provisioning pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(
        "Unsupported host architecture '{0}'. cloudflared is published for amd64, arm64, arm and 386."
    )]
    UnsupportedArchitecture(String),

    #[error("Required {what} not found: {}", .path.display())]
    MissingFile { what: &'static str, path: PathBuf },

    #[error(
        "Cloudflare credential not found at {} after login.\n\nRe-run and complete the browser authorization: pitunnel provision",
        .0.display()
    )]
    MissingCredentials(PathBuf),

    #[error("Cloudflare login declined. Re-run with --yes or authorize with: cloudflared tunnel login")]
    LoginDeclined,

    #[error("Could not resolve or create tunnel '{name}': {detail}")]
    TunnelUnresolved { name: String, detail: String },

    #[error("Could not route {hostname} to the tunnel: {detail}")]
    DnsRouting { hostname: String, detail: String },

    #[error("Ingress configuration is invalid:\n{0}")]
    InvalidIngress(String),

    #[error("{program} exited with {status}\n{stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating a `ProvisionConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Rendering errors ──────────────────────────────────────────────────────────

/// Errors raised by the typed file renderers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("{field} of unit '{unit}' contains a line break")]
    LineBreak { unit: String, field: String },

    #[error("{field} of unit '{unit}' must not be empty")]
    Empty { unit: String, field: &'static str },

    #[error("Invalid tunnel id '{0}': expected a UUID")]
    InvalidTunnelId(String),

    #[error("Ingress must end with a catch-all rule")]
    MissingCatchAll,

    #[error("Ingress rule {0} has no hostname but is not the last rule")]
    CatchAllNotLast(usize),
}
