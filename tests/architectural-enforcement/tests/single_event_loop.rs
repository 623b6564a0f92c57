//! Integration Test: Single Event Loop
//!
//! **Policy**: the display core owns all of its state from one cooperative
//! loop. It MUST NOT start threads or spawn tasks; transitions stay ordered
//! only because nothing runs beside the kiosk loop. Spawning belongs to the
//! binary that embeds the core.

use architectural_enforcement::{production_lines_of, rust_files, violation, CORE_DIR};

const FORBIDDEN: &[&str] = &[
    "thread::spawn",
    "thread::Builder",
    "tokio::spawn",
    "spawn_blocking",
    "spawn_local",
    "Runtime::new",
];

#[test]
fn test_core_never_spawns() {
    let mut violations = Vec::new();

    for path in rust_files(CORE_DIR) {
        for line in &production_lines_of(&path) {
            if FORBIDDEN.iter().any(|p| line.code.contains(p)) {
                violations.push(violation(&path, line));
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Concurrency primitives found in the display core!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Instead:");
        eprintln!("  - Keep in-flight work as a future owned by the loop (see Poller)");
        eprintln!("  - Schedule a cue on the animation timeline");

        panic!(
            "\nFound {} spawn violation(s) in the display core.\nFix these before merging!",
            violations.len()
        );
    }
}

#[test]
fn test_core_has_no_locks() {
    let mut violations = Vec::new();

    for path in rust_files(CORE_DIR) {
        for line in &production_lines_of(&path) {
            if line.code.contains("Mutex") || line.code.contains("RwLock") {
                violations.push(violation(&path, line));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "display core state is owned by the loop, found locks:\n{}",
        violations.join("\n")
    );
}
