//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod arch;
pub mod config;
pub mod error;
pub mod health;
pub mod ingress;
pub mod pipeline;
pub mod tunnel;
pub mod unit;

pub use arch::CloudflaredArch;
pub use config::{ConfigOverrides, ProvisionConfig, VerifyConfig};
pub use error::{ConfigError, ProvisionError, RenderError};
pub use health::{HealthStatus, HttpResponse, classify};
pub use ingress::{IngressConfig, IngressRule};
pub use pipeline::{RunReport, Stage, StageFailure, StageOutcome};
pub use tunnel::TunnelRecord;
pub use unit::{ServiceState, SystemdUnit};
