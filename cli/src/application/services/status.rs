//! Status use-case: service states and a one-shot health check.

use std::time::Duration;

use crate::application::ports::{HealthProbe, ServiceManager};
use crate::application::services::provision::verify::poll;
use crate::domain::{HealthStatus, ProvisionConfig, ServiceState};

/// Snapshot of a provisioned host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// `(unit name, state)` for the tunnel daemon, then the application server.
    pub services: Vec<(String, ServiceState)>,
    pub local: HealthStatus,
    pub public: HealthStatus,
}

impl StatusReport {
    #[must_use]
    pub fn all_healthy(&self) -> bool {
        self.services.iter().all(|(_, s)| s.is_active())
            && self.local.is_healthy()
            && self.public.is_healthy()
    }
}

/// Query both units and probe each endpoint once.
///
/// A unit whose state cannot be read is reported as unknown rather than
/// failing the whole snapshot.
pub async fn collect(
    services: &impl ServiceManager,
    probe: &impl HealthProbe,
    config: &ProvisionConfig,
) -> StatusReport {
    let mut states = Vec::with_capacity(2);
    for unit in [&config.tunnel_service, &config.app_service] {
        let state = match services.state(unit).await {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(unit = %unit, error = %format!("{e:#}"), "state query failed");
                ServiceState::Other(String::new())
            }
        };
        states.push((unit.clone(), state));
    }

    StatusReport {
        services: states,
        local: poll(probe, &config.local_health_url(), 1, Duration::ZERO).await,
        public: poll(probe, &config.public_health_url(), 1, Duration::ZERO).await,
    }
}

/// Shell commands an operator can run to check the deployment by hand.
#[must_use]
pub fn verification_commands(config: &ProvisionConfig) -> Vec<String> {
    vec![
        format!("curl {}", config.local_health_url()),
        format!("curl {}", config.public_health_url()),
        format!(
            "systemctl status {} {}",
            config.tunnel_service, config.app_service
        ),
        format!("journalctl -u {} -f", config.app_service),
        format!("journalctl -u {} -f", config.tunnel_service),
    ]
}
