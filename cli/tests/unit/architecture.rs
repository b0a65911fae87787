//! Structural tests for layer boundary enforcement.
//!
//! These tests scan source files so that the domain stays pure and the
//! pipeline never reaches past its ports into concrete adapters.

use std::path::{Path, PathBuf};

fn src_dir(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Non-comment lines outside `#[cfg(test)]` blocks.
fn production_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut depth = 0_i32;
    let mut test_block: Option<i32> = None;
    let mut out = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") && test_block.is_none() {
            test_block = Some(depth);
        }
        let in_test = test_block.is_some();
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if test_block.is_some_and(|start| depth <= start) {
                        test_block = None;
                    }
                }
                _ => {}
            }
        }
        if !in_test && !trimmed.starts_with("//") && !trimmed.is_empty() {
            out.push(line.to_string());
        }
    }
    out
}

fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    let files = collect_rs_files(&src_dir(layer));
    assert!(!files.is_empty(), "no sources found under src/{layer}");
    let mut found = Vec::new();
    for file in files {
        for line in production_lines(&file) {
            if let Some(pattern) = forbidden.iter().find(|p| line.contains(*p)) {
                found.push(format!("{}: {pattern}: {}", file.display(), line.trim()));
            }
        }
    }
    found
}

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let found = violations(
        "domain",
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(found.is_empty(), "domain boundary violations:\n{}", found.join("\n"));
}

#[test]
fn application_depends_only_on_domain_and_ports() {
    let found = violations(
        "application",
        &["crate::infra", "crate::commands", "crate::output", "std::fs"],
    );
    assert!(
        found.is_empty(),
        "application boundary violations:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_never_reaches_up_into_commands() {
    let found = violations("infra", &["crate::commands", "crate::output", "crate::cli"]);
    assert!(found.is_empty(), "infra boundary violations:\n{}", found.join("\n"));
}
