//! Unit tests for pitunnel
//!
//! These tests drive the provisioning pipeline against an in-memory host and
//! run fast without external I/O.

mod architecture;
mod pipeline;
