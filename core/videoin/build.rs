// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::process::Command;

fn set_env(name: &str, cmd: &mut Command, fallback: &str) {
    let value = match cmd.output() {
        Ok(output) if output.status.success() => {
            String::from_utf8(output.stdout).unwrap_or_default()
        }
        Ok(_) => String::new(),
        Err(err) => {
            println!("cargo:warning={}", err);
            String::new()
        }
    };

    let value = value.trim();
    let value = if value.is_empty() { fallback } else { value };
    println!("cargo:rustc-env={}={}", name, value);
}

fn main() {
    // Set build info environment variables
    set_env(
        "GIT_SHA",
        Command::new("git").args(["rev-parse", "--short", "HEAD"]),
        "unknown",
    );
    set_env(
        "BUILD_DATE",
        Command::new("date").args(["-u", "+%Y-%m-%dT%H:%M:%SZ"]),
        "unknown",
    );

    let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    set_env(
        "VERSION",
        Command::new("git").args(["describe", "--tags", "--always", "--match", "videoin-v*"]),
        &pkg_version,
    );

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=PROFILE={profile}");
}
