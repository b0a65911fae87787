//! HTTP health probe — implements `HealthProbe` with `ureq` on a blocking thread.

use std::io::Read;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::HealthProbe;
use crate::domain::HttpResponse;

/// Bodies larger than this are truncated; health answers are tiny.
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub struct UreqProbe {
    agent: ureq::Agent,
}

impl UreqProbe {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .user_agent("pitunnel")
                .build(),
        }
    }
}

impl HealthProbe for UreqProbe {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let response = match agent.get(&url).call() {
                Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
                Err(e) => return Err(anyhow::Error::new(e)),
            };
            let status = response.status();
            let mut body = String::new();
            // An unreadable body still carries a status.
            let _ = response
                .into_reader()
                .take(MAX_BODY_BYTES)
                .read_to_string(&mut body);
            Ok(HttpResponse { status, body })
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }
}
