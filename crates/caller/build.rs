use std::{env, process::Command};

fn main() {
    println!("cargo:rerun-if-env-changed=RUSTC");

    if let Some(version) = rustc_version() {
        println!("cargo:rustc-env=SITELOG_RUSTC_VERSION={version}");
    }
}

/// Returns the `x.y.z` part of `rustc --version`, e.g. `1.88.0`.
fn rustc_version() -> Option<String> {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_owned());
    let output = Command::new(rustc).arg("--version").output().ok()?;

    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8(output.stdout).ok()?;
    let version = text.split_whitespace().nth(1)?;
    let trimmed = version.split('-').next().unwrap_or(version);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
