//! Integration tests for pitunnel
//!
//! These tests spawn the actual binary. None of them provisions anything:
//! they cover argument parsing, configuration handling and rendering.

mod cli_tests;
mod render_command;
