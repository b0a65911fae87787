//! Version command

/// Run the version command.
pub fn run() {
    println!("pitunnel {}", env!("CARGO_PKG_VERSION"));
}
