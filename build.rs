//! Build script for systray-ksni.
//!
//! Captures the short git hash reported by `build_info::build_hash()`.

use std::process::Command;

fn main() {
    let hash = get_git_hash();
    println!("cargo:rustc-env=SYSTRAY_BUILD_HASH={hash}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=SYSTRAY_BUILD_HASH");
}

/// Get the short hash of the checked out commit, or "unknown".
fn get_git_hash() -> String {
    if let Ok(hash) = std::env::var("SYSTRAY_BUILD_HASH") {
        return hash;
    }

    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
