//! Typed cloudflared ingress configuration.
//!
//! The file is produced by serialising [`IngressConfig`] rather than by
//! string interpolation, so the same `{tunnel id, hostname, port}` always
//! yields byte-identical output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::config::ProvisionConfig;
use crate::domain::error::RenderError;
use crate::domain::tunnel::is_valid_tunnel_id;

/// Service answered for requests that match no hostname.
pub const CATCH_ALL_SERVICE: &str = "http_status:404";

const HEADER: &str = "# Generated by pitunnel - DO NOT EDIT\n";

/// Root of `config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct IngressConfig {
    pub tunnel: String,
    pub credentials_file: PathBuf,
    pub ingress: Vec<IngressRule>,
}

/// One hostname → service mapping. The last rule carries no hostname.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub service: String,
}

impl IngressRule {
    #[must_use]
    pub fn route(hostname: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            service: service.into(),
        }
    }

    #[must_use]
    pub fn catch_all() -> Self {
        Self {
            hostname: None,
            service: CATCH_ALL_SERVICE.to_string(),
        }
    }
}

impl IngressConfig {
    /// Ingress for the configured hostname → local server, plus the catch-all.
    #[must_use]
    pub fn for_tunnel(config: &ProvisionConfig, tunnel_id: &str) -> Self {
        Self {
            tunnel: tunnel_id.to_string(),
            credentials_file: config.credentials_path(tunnel_id),
            ingress: vec![
                IngressRule::route(config.hostname(), config.local_service_url()),
                IngressRule::catch_all(),
            ],
        }
    }

    /// Structural checks cloudflared would otherwise reject at start-up.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` for a malformed tunnel id or a misplaced catch-all.
    pub fn check(&self) -> Result<(), RenderError> {
        if !is_valid_tunnel_id(&self.tunnel) {
            return Err(RenderError::InvalidTunnelId(self.tunnel.clone()));
        }
        match self.ingress.last() {
            Some(rule) if rule.hostname.is_none() => {}
            _ => return Err(RenderError::MissingCatchAll),
        }
        let last = self.ingress.len() - 1;
        if let Some(pos) = self.ingress[..last]
            .iter()
            .position(|r| r.hostname.is_none())
        {
            return Err(RenderError::CatchAllNotLast(pos));
        }
        Ok(())
    }

    /// Render `config.yml` content.
    ///
    /// # Errors
    ///
    /// Returns an error if the structural check fails or serialisation fails.
    pub fn render(&self) -> Result<String> {
        self.check()?;
        let body = serde_yaml::to_string(self).context("serialising ingress config")?;
        Ok(format!("{HEADER}{body}"))
    }
}
