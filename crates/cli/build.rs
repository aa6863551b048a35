//! Build script for palmlines CLI
//!
//! Generates build-time metadata for version output

use std::env;

fn main() {
    // Set build-time environment variables for use in clap
    println!(
        "cargo:rustc-env=PALMLINES_BUILD_HOST={}",
        env::var("HOST").unwrap_or_else(|_| "unknown".to_string())
    );
    println!(
        "cargo:rustc-env=PALMLINES_GIT_COMMIT={}",
        env::var("GIT_COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string())
    );
    println!(
        "cargo:rustc-env=PALMLINES_BUILD_TIME={}",
        chrono::Utc::now().to_rfc3339()
    );
    println!("cargo:rerun-if-env-changed=GIT_COMMIT_HASH");
}
