//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code
//! - No blocking I/O inside async functions
//! - The display core runs on a single event loop (no threads, no spawned tasks)
//!
//! These tests are designed to catch violations early in the development cycle.
//! The helpers below give every test the same view of production code: comments
//! stripped, and everything from a file's `#[cfg(test)]` module onwards ignored.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source roots, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["display/core/src", "display/daemon/src"];

/// Source root of the display core
pub const CORE_DIR: &str = "display/core/src";

/// Workspace root, resolved from this package's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
///
/// Panics if `dir` does not exist, so a moved crate cannot silently pass.
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    assert!(root.exists(), "source directory {} is missing", root.display());

    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// A line of production code with its comment removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// 1-based line number
    pub number: usize,
    /// Code before any `//`
    pub code: String,
}

/// Production lines of `content`
///
/// Stops at the first `#[cfg(test)]`. Test modules sit at the bottom of each
/// file in this workspace.
#[must_use]
pub fn production_lines(content: &str) -> Vec<CodeLine> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| CodeLine {
            number: idx + 1,
            code: line.split("//").next().unwrap_or(line).to_string(),
        })
        .collect()
}

/// Read a file and return its production lines
#[must_use]
pub fn production_lines_of(path: &Path) -> Vec<CodeLine> {
    match fs::read_to_string(path) {
        Ok(content) => production_lines(&content),
        Err(_) => Vec::new(),
    }
}

/// Whether the function enclosing `lines[idx]` is declared `async`
///
/// Scans backwards for the nearest `fn` signature.
#[must_use]
pub fn is_in_async_function(lines: &[CodeLine], idx: usize) -> bool {
    for line in lines[..=idx].iter().rev() {
        let code = line.code.trim();
        if is_fn_signature(code) {
            return code.contains("async fn");
        }
    }
    false
}

fn is_fn_signature(code: &str) -> bool {
    let code = code
        .trim_start_matches("pub(crate) ")
        .trim_start_matches("pub ")
        .trim_start_matches("const ");
    code.starts_with("fn ") || code.starts_with("async fn ")
}

/// Format a violation for the failure report
#[must_use]
pub fn violation(path: &Path, line: &CodeLine) -> String {
    let root = workspace_root();
    let shown = path.strip_prefix(&root).unwrap_or(path);
    format!("{}:{} - {}", shown.display(), line.number, line.code.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_module_is_ignored() {
        let source = "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() { std::thread::sleep(d); }\n}\n";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].code, "fn a() {}");
    }

    #[test]
    fn test_comments_are_stripped() {
        let lines = production_lines("let x = 1; // tokio::spawn(later)\n/// tokio::spawn\n");
        assert_eq!(lines[0].code, "let x = 1; ");
        assert!(lines[1].code.trim().is_empty());
    }

    #[test]
    fn test_async_function_detection() {
        let lines = production_lines(
            "pub async fn run(&mut self) {\n    read();\n}\nfn load() {\n    read();\n}\n",
        );
        assert!(is_in_async_function(&lines, 1));
        assert!(!is_in_async_function(&lines, 4));
    }
}
