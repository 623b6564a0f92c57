//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions MUST NOT use blocking I/O. Config loading and
//! timezone detection read files synchronously, which is fine because they
//! run before the kiosk loop starts; anything inside an `async fn` shares the
//! one loop with every animation deadline.

use architectural_enforcement::{
    is_in_async_function, production_lines_of, rust_files, violation, PRODUCTION_DIRS,
};

const BLOCKING_PATTERNS: &[&str] = &[
    "std::fs::",
    "std::net::",
    "std::io::stdin",
    "std::io::stdout",
    "std::process::Command",
    "reqwest::blocking",
];

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for path in rust_files(dir) {
            let lines = production_lines_of(&path);
            for (idx, line) in lines.iter().enumerate() {
                if !BLOCKING_PATTERNS.iter().any(|p| line.code.contains(p)) {
                    continue;
                }
                if is_in_async_function(&lines, idx) {
                    violations.push(violation(&path, line));
                }
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in async code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::io::stdout() with AsyncWriteExt");
        eprintln!("  - reqwest::Client (async)");
        eprintln!("\n✅ ACCEPTABLE blocking I/O:");
        eprintln!("  - Non-async functions (config loading before the loop starts)");
        eprintln!("  - Test code");

        panic!(
            "\nFound {} blocking I/O violation(s) in async code.\nFix these before merging!",
            violations.len()
        );
    }
}
