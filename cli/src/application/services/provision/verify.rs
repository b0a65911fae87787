//! Stage 9 — poll the local and public health endpoints.

use std::time::Duration;

use crate::application::ports::HealthProbe;
use crate::domain::{HealthStatus, ProvisionConfig, StageOutcome, classify};

/// Probe `url` up to `attempts` times, sleeping `interval` between tries.
///
/// Stops at the first healthy answer. Otherwise returns the most
/// informative result seen: any HTTP answer beats no answer at all.
pub async fn poll(
    probe: &impl HealthProbe,
    url: &str,
    attempts: u32,
    interval: Duration,
) -> HealthStatus {
    let mut last = HealthStatus::Unreachable {
        reason: "no attempts made".to_string(),
    };
    for attempt in 1..=attempts.max(1) {
        let status = match probe.get(url).await {
            Ok(response) => classify(&response),
            Err(e) => HealthStatus::Unreachable {
                reason: format!("{e:#}"),
            },
        };
        tracing::debug!(url, attempt, %status, "health probe");
        if status.is_healthy() {
            return status;
        }
        if status.is_reachable() || !last.is_reachable() {
            last = status;
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    last
}

/// Check the local server, then the public route.
///
/// Never fails: an unhealthy endpoint is reported as a warning with the
/// best status observed.
pub async fn verify(probe: &impl HealthProbe, config: &ProvisionConfig) -> StageOutcome {
    let budget = &config.verify;
    let local = poll(
        probe,
        &config.local_health_url(),
        budget.local_attempts,
        Duration::from_secs(budget.local_interval_secs),
    )
    .await;
    let public = poll(
        probe,
        &config.public_health_url(),
        budget.public_attempts,
        Duration::from_secs(budget.public_interval_secs),
    )
    .await;

    let summary = format!("local {local}, public {public}");
    if local.is_healthy() && public.is_healthy() {
        StageOutcome::Done(summary)
    } else {
        StageOutcome::Warned(summary)
    }
}
