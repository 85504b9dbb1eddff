//! Wrapper that turns a [`GenerateConfig`](crate::config::GenerateConfig) and a
//! prompt into an `mlx_lm.generate` invocation

pub mod args;
pub mod cli_wrapper;

pub use args::{build_command_args, render_command_line, GENERATE_MODULE};
pub use cli_wrapper::CliWrapper;
