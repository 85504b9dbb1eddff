//! # stylegen Core
//!
//! Core library for stylegen - style rewriting of short texts through the
//! `mlx_lm.generate` command line tool.
//!
//! The library packages the tool behind a typed [`GenerateConfig`] and runs it
//! as a child process through [`CliWrapper`]. Every failure is reported as a
//! [`GenerateError`] whose [`GenerateErrorKind`] tells callers whether the
//! process could not start, ran past its deadline, or exited with an error.

// Core modules
pub mod config;
pub mod error;
pub mod process;
pub mod wrapper;

// Re-export commonly used types
pub use config::GenerateConfig;
pub use error::{ConfigError, Error, GenerateError, GenerateErrorKind, Result};
pub use wrapper::{build_command_args, render_command_line, CliWrapper};

/// Current version of the stylegen-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
