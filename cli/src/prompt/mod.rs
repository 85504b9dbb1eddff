//! Prompt templates fed to the generation tool
//!
//! Prompts are plain text rather than chat-template messages, so a run through
//! the CLI behaves exactly like typing the same prompt into a shell.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::json;
use std::path::Path;

/// Rewrite a colloquial passage into formal written Chinese
pub const FORMAL_REWRITE: &str = "formal_rewrite";
/// Write a short story imitating a named author or genre
pub const STYLE_IMITATION: &str = "style_imitation";

const FORMAL_REWRITE_TEMPLATE: &str = "\
你是一位擅长正式书面语写作的中文编辑。
请在尽量保持原文语义不变的前提下，把下面这段话改写成正式、规范、书面化的中文风格。

原文：{{text}}

改写：";

const STYLE_IMITATION_TEMPLATE: &str = "\
指令：仿照{{style}}的写作风格，写一小段中文故事。
输出：";

/// Registry of named prompt templates
pub struct PromptTemplates {
    registry: Handlebars<'static>,
}

impl PromptTemplates {
    /// Create a registry holding the built-in templates
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        registry
            .register_template_string(FORMAL_REWRITE, FORMAL_REWRITE_TEMPLATE)
            .context("Failed to register formal_rewrite template")?;
        registry
            .register_template_string(STYLE_IMITATION, STYLE_IMITATION_TEMPLATE)
            .context("Failed to register style_imitation template")?;
        Ok(Self { registry })
    }

    /// Replace a template with the contents of a file
    pub fn override_from_file(&mut self, name: &str, path: &Path) -> Result<()> {
        self.registry
            .register_template_file(name, path)
            .with_context(|| format!("Failed to load prompt template: {}", path.display()))
    }

    /// Prompt asking for `text` to be rewritten in formal style
    pub fn formal_rewrite(&self, text: &str) -> Result<String> {
        self.render(FORMAL_REWRITE, &json!({ "text": text }))
    }

    /// Prompt asking for a short story in the style of `style`
    pub fn style_imitation(&self, style: &str) -> Result<String> {
        self.render(STYLE_IMITATION, &json!({ "style": style }))
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String> {
        let rendered = self
            .registry
            .render(name, data)
            .with_context(|| format!("Failed to render prompt template '{}'", name))?;
        Ok(rendered.trim().to_string())
    }
}
