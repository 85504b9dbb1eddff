//! CLI command implementations

pub mod generate;
pub mod rewrite;
pub mod show_command;

pub use generate::generate_command;
pub use rewrite::{imitate_command, rewrite_command};
pub use show_command::show_command;
