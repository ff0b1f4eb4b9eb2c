//! Embeds build identification for the startup banner and `GET /buildinfo`

use std::process::Command;

/// Short commit id, or "unknown" outside a git checkout
fn commit_id() -> String {
    let output = match Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() {
        Ok(output) if output.status.success() => output,
        _ => return "unknown".to_string(),
    };

    match String::from_utf8(output.stdout) {
        Ok(hash) if !hash.trim().is_empty() => hash.trim().to_string(),
        _ => "unknown".to_string(),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");

    let stamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    for (key, value) in [
        ("GIT_HASH", commit_id()),
        ("BUILD_TIMESTAMP", stamp.to_string()),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={}={}", key, value);
    }
}
