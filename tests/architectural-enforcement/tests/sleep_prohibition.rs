//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. The kiosk waits on
//! exactly three things (shutdown, the next poll result, the next animation
//! deadline) and deadlines are awaited with `sleep_until` on a known instant.
//! **Exceptions**: test code

use architectural_enforcement::{production_lines_of, rust_files, violation, PRODUCTION_DIRS};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for path in rust_files(dir) {
            let lines = production_lines_of(&path);
            for line in &lines {
                if is_sleep_call(&line.code) {
                    violations.push(violation(&path, line));
                }
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ACCEPTABLE waits:");
        eprintln!("  - tokio::time::sleep_until(deadline) on a scheduled animation cue");
        eprintln!("  - tokio::time::interval() for the poll cadence");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep between polls");
        eprintln!("  - Sleep to 'wait' for an animation to finish");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(") || code.contains(" sleep(")
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("    std::thread::sleep(d);"));
    assert!(!is_sleep_call("        Some(deadline) => sleep_until(deadline).await,"));
}
