//! Style rewriting commands built on prompt templates

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use stylegen_core::CliWrapper;
use tracing::{debug, info};

use crate::prompt::{PromptTemplates, FORMAL_REWRITE, STYLE_IMITATION};

/// Rewrite `text` into formal written style
pub async fn rewrite_command(
    text: String,
    template: Option<PathBuf>,
    config_loader: crate::config::CliConfigLoader,
    timeout: Option<Duration>,
) -> Result<()> {
    let mut templates = PromptTemplates::new()?;
    if let Some(path) = &template {
        info!("📄 Using prompt template: {}", path.display());
        templates.override_from_file(FORMAL_REWRITE, path)?;
    }
    let prompt = templates.formal_rewrite(&text)?;
    debug!("Prompt:\n{}", prompt);

    let wrapper = CliWrapper::new(config_loader.load().await?);
    let rewritten = wrapper.generate(&prompt, timeout).await?;

    println!("原文：");
    println!("{}", text);
    println!();
    println!("改写：");
    println!("{}", rewritten);
    Ok(())
}

/// Write a short passage imitating `style`
pub async fn imitate_command(
    style: String,
    template: Option<PathBuf>,
    config_loader: crate::config::CliConfigLoader,
    timeout: Option<Duration>,
) -> Result<()> {
    let mut templates = PromptTemplates::new()?;
    if let Some(path) = &template {
        info!("📄 Using prompt template: {}", path.display());
        templates.override_from_file(STYLE_IMITATION, path)?;
    }
    let prompt = templates.style_imitation(&style)?;
    debug!("Prompt:\n{}", prompt);

    let wrapper = CliWrapper::new(config_loader.load().await?);
    let story = wrapper.generate(&prompt, timeout).await?;

    println!("{}", story);
    Ok(())
}
