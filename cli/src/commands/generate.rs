//! Raw prompt generation command

use anyhow::Result;
use std::time::Duration;
use stylegen_core::CliWrapper;
use tracing::{debug, info};

/// Send `prompt` to the generation tool as-is and print the result
pub async fn generate_command(
    prompt: String,
    config_loader: crate::config::CliConfigLoader,
    timeout: Option<Duration>,
) -> Result<()> {
    let config = config_loader.load().await?;
    info!("🤖 Using model: {}", config.model);
    if let Some(adapter) = &config.adapter_path {
        info!("🧩 Using adapter: {}", adapter.display());
    }
    debug!("Prompt: {}", prompt);

    let wrapper = CliWrapper::new(config);
    let output = wrapper.generate(&prompt, timeout).await?;

    println!("{}", output);
    Ok(())
}
