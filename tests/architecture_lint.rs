//! Architecture enforcement tests.
//!
//! Layering rules that the compiler cannot check:
//!
//! 1. **Writes go through the sync engine** - command handlers never call
//!    `put_file` or `create_repository` themselves, so the unchanged-file
//!    check cannot be skipped
//! 2. **Only the CLI prints** - library modules report through return values
//!    and `tracing`, never stdout/stderr
//! 3. **HTTP clients live in two places** - the GitHub forge and the problem
//!    catalog

use std::fs;
use std::path::{Path, PathBuf};

/// Library modules that must not print.
const LIBRARY_DIRS: &[&str] = &["src/core", "src/forge", "src/sync", "src/push", "src/secrets"];

/// Files allowed to build a `reqwest` client.
const HTTP_CLIENT_FILES: &[&str] = &["src/forge/github.rs", "src/push/catalog.rs"];

/// All `.rs` files under `dir`, recursively.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read directory") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            files.push(path);
        }
    }
    files
}

/// Source lines, skipping comments and doc comments.
fn code_lines(path: &Path) -> Vec<(usize, String)> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

#[test]
fn commands_write_only_through_sync_engine() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/cli")) {
        for (line_no, line) in code_lines(&path) {
            if line.contains(".put_file(") || line.contains(".create_repository(") {
                violations.push(format!("{}:{}: {}", path.display(), line_no, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "CLI code must write through SyncEngine/PushService:\n{}",
        violations.join("\n")
    );
}

#[test]
fn library_modules_do_not_print() {
    let mut violations = Vec::new();

    for dir in LIBRARY_DIRS {
        for path in rust_files(Path::new(dir)) {
            for (line_no, line) in code_lines(&path) {
                if line.contains("println!") || line.contains("print!(") {
                    violations.push(format!("{}:{}: {}", path.display(), line_no, line.trim()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Library modules must use tracing instead of printing:\n{}",
        violations.join("\n")
    );
}

#[test]
fn http_clients_are_confined() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src")) {
        let normalized = path.to_string_lossy().replace('\\', "/");
        if HTTP_CLIENT_FILES.contains(&normalized.as_str()) {
            continue;
        }
        for (line_no, line) in code_lines(&path) {
            if line.contains("reqwest::") || line.contains("Client::builder") {
                violations.push(format!("{}:{}: {}", normalized, line_no, line.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Only the GitHub forge and the catalog may build HTTP clients:\n{}",
        violations.join("\n")
    );
}
