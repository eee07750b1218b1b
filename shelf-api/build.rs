//! Embeds build identification for `/health` and the startup log
//!
//! Sets `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` for the crate.

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");

    let git_hash = short_commit().unwrap_or_else(|| UNKNOWN.to_string());
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    for (key, value) in [
        ("GIT_HASH", git_hash.as_str()),
        ("BUILD_TIMESTAMP", built_at.as_str()),
        ("BUILD_PROFILE", profile.as_str()),
    ] {
        println!("cargo:rustc-env={}={}", key, value);
    }
}

/// Abbreviated HEAD commit, `None` outside a git checkout
fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}
