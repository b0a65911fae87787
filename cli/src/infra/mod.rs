//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, host
//! package management, cloudflared and systemd calls, HTTP and filesystem.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod cloudflared;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod host;
pub mod http;
pub mod python;
pub mod release;
pub mod systemd;
