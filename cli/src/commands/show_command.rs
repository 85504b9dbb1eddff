//! Print the command line without running it

use anyhow::Result;
use stylegen_core::build_command_args;

/// Print the argument vector for `prompt`, one element per line
pub async fn show_command(
    prompt: String,
    config_loader: crate::config::CliConfigLoader,
) -> Result<()> {
    let config = config_loader.load().await?;

    for arg in build_command_args(&config, &prompt) {
        println!("{}", arg);
    }
    Ok(())
}
