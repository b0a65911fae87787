//! Provisioning pipeline vocabulary: stages, outcomes, and the run report.

use thiserror::Error;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Dependencies,
    Workspace,
    Credentials,
    Tunnel,
    IngressConfig,
    DnsRoute,
    ConfigValidation,
    Services,
    Verification,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Dependencies,
        Stage::Workspace,
        Stage::Credentials,
        Stage::Tunnel,
        Stage::IngressConfig,
        Stage::DnsRoute,
        Stage::ConfigValidation,
        Stage::Services,
        Stage::Verification,
    ];

    /// 1-based position in the pipeline.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dependencies => "dependency install",
            Self::Workspace => "workspace setup",
            Self::Credentials => "secret acquisition",
            Self::Tunnel => "tunnel registration",
            Self::IngressConfig => "config materialization",
            Self::DnsRoute => "DNS binding",
            Self::ConfigValidation => "config validation",
            Self::Services => "service installation",
            Self::Verification => "post-install verification",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}] {}", self.ordinal(), Stage::ALL.len(), self.name())
    }
}

/// How a stage finished when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The action ran.
    Done(String),
    /// The pre-condition already held.
    Skipped(String),
    /// Finished, but with a non-fatal problem.
    Warned(String),
}

impl StageOutcome {
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Done(s) | Self::Skipped(s) | Self::Warned(s) => s,
        }
    }
}

/// A fatal stage failure. Later stages never ran.
#[derive(Debug, Error)]
#[error("stage {} ({}) failed: {:#}", .stage.ordinal(), .stage.name(), .error)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: anyhow::Error,
}

/// Ordered record of a pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub stages: Vec<(Stage, StageOutcome)>,
    /// Tunnel resolved by the registration stage.
    pub tunnel_id: Option<String>,
    /// Whether registration created the tunnel rather than reusing it.
    pub tunnel_created: bool,
}

impl RunReport {
    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.push((stage, outcome));
    }

    #[must_use]
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find_map(|(s, o)| (*s == stage).then_some(o))
    }

    pub fn warnings(&self) -> impl Iterator<Item = (Stage, &str)> {
        self.stages.iter().filter_map(|(s, o)| match o {
            StageOutcome::Warned(msg) => Some((*s, msg.as_str())),
            _ => None,
        })
    }
}
