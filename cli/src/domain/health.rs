//! Health classification of the sensor server's `/health` endpoint.
//!
//! The server answers `200` with a JSON body whose `data[0].status` is
//! `healthy` or `degraded`; anything else is treated as unhealthy.

use serde_json::Value;

/// Raw HTTP answer captured by a health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Result of probing one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Reachable, but the application reports a degraded state.
    Degraded { reason: String },
    /// Reachable, but answered with an error.
    Unhealthy { reason: String },
    /// Never answered within the polling budget.
    Unreachable { reason: String },
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Degraded and unhealthy answers still prove the route works end to end.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::Unreachable { .. })
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Degraded { reason } => write!(f, "degraded ({reason})"),
            Self::Unhealthy { reason } => write!(f, "unhealthy ({reason})"),
            Self::Unreachable { reason } => write!(f, "unreachable ({reason})"),
        }
    }
}

/// Classify an HTTP answer from `/health`.
///
/// A 2xx answer whose body is not the expected JSON still counts as healthy:
/// the route and the server are up, which is all verification needs.
#[must_use]
pub fn classify(response: &HttpResponse) -> HealthStatus {
    if !(200..300).contains(&response.status) {
        return HealthStatus::Unhealthy {
            reason: format!("HTTP {}", response.status),
        };
    }

    let Ok(body) = serde_json::from_str::<Value>(&response.body) else {
        return HealthStatus::Healthy;
    };
    let status = body
        .pointer("/data/0/status")
        .or_else(|| body.get("status"))
        .and_then(Value::as_str);

    match status {
        Some("degraded") => HealthStatus::Degraded {
            reason: degraded_sensors(&body),
        },
        Some("unhealthy") => HealthStatus::Unhealthy {
            reason: "application reports unhealthy".to_string(),
        },
        _ => HealthStatus::Healthy,
    }
}

/// Names of sensors flagged `healthy: false`, sorted.
fn degraded_sensors(body: &Value) -> String {
    let mut names: Vec<&str> = body
        .pointer("/data/0/sensors")
        .and_then(Value::as_object)
        .map(|sensors| {
            sensors
                .iter()
                .filter(|(_, s)| s.get("healthy").and_then(Value::as_bool) == Some(false))
                .map(|(name, _)| name.as_str())
                .collect()
        })
        .unwrap_or_default();
    if names.is_empty() {
        return "application reports degraded".to_string();
    }
    names.sort_unstable();
    format!("sensors down: {}", names.join(", "))
}
