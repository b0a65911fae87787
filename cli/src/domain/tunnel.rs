//! Tunnel records as reported by `cloudflared tunnel list --output json`.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use serde::Deserialize;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static TUNNEL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static CREATED_TUNNEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Created tunnel \S+ with id ([0-9a-fA-F-]{36})").expect("valid regex")
});

/// A tunnel registered with Cloudflare.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TunnelRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// cloudflared reports `0001-01-01T00:00:00Z` for live tunnels.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TunnelRecord {
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some_and(|t| t.year() > 1)
    }
}

/// Parse the JSON array printed by `cloudflared tunnel list --output json`.
///
/// An empty document or `null` means no tunnels.
///
/// # Errors
///
/// Returns an error if the output is not a JSON array of tunnel objects.
pub fn parse_tunnel_list(json: &str) -> Result<Vec<TunnelRecord>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let records: Option<Vec<TunnelRecord>> =
        serde_json::from_str(trimmed).context("parsing cloudflared tunnel list output")?;
    Ok(records.unwrap_or_default())
}

/// Find the live tunnel with exactly this name.
///
/// Should the provider ever report two, the oldest wins so repeated runs
/// keep resolving to the same id.
#[must_use]
pub fn find_live<'a>(records: &'a [TunnelRecord], name: &str) -> Option<&'a TunnelRecord> {
    records
        .iter()
        .filter(|r| r.name == name && !r.is_deleted())
        .min_by_key(|r| r.created_at)
}

/// Extract the tunnel id from `cloudflared tunnel create` output.
#[must_use]
pub fn parse_created_id(output: &str) -> Option<String> {
    CREATED_TUNNEL
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

#[must_use]
pub fn is_valid_tunnel_id(id: &str) -> bool {
    TUNNEL_ID.is_match(id)
}
