//! Generation configuration types for stylegen core
//!
//! Core only accepts fully populated configuration values.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default base model
pub const DEFAULT_MODEL: &str = "Qwen/Qwen2-7B-Instruct-MLX";
/// Default generation length cap
pub const DEFAULT_MAX_TOKENS: u32 = 256;
/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
/// Default nucleus sampling threshold
pub const DEFAULT_TOP_P: f32 = 1.0;
/// Default random seed
pub const DEFAULT_SEED: u64 = 0;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> Option<f32> {
    Some(DEFAULT_TEMPERATURE)
}

fn default_top_p() -> Option<f32> {
    Some(DEFAULT_TOP_P)
}

fn default_seed() -> Option<u64> {
    Some(DEFAULT_SEED)
}

fn default_echo_command_on_error() -> bool {
    true
}

/// How to run `mlx_lm.generate`.
///
/// The struct only describes the invocation; it is not tied to any particular
/// rewriting task. Optional sampling fields map one-to-one onto command-line
/// flags: `None` omits the flag and lets the tool use its own default, while
/// `Some(0)`/`Some(0.0)` is passed through as an explicit value.
///
/// Nothing is validated on construction. Call [`GenerateConfig::validate`] to
/// check the values before handing the config to a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Model identifier or local path passed to `--model`
    #[serde(default = "default_model")]
    pub model: String,

    /// Fine-tuned adapter weights applied on top of the base model
    #[serde(default)]
    pub adapter_path: Option<PathBuf>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,

    /// Top-p sampling parameter
    #[serde(default = "default_top_p")]
    pub top_p: Option<f32>,

    /// Random seed; `None` leaves generation non-deterministic
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,

    /// Interpreter or binary that hosts the `mlx_lm.generate` module
    pub executable: String,

    /// Additional flags appended verbatim before `--prompt`
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Whether error reports include the full command line
    #[serde(default = "default_echo_command_on_error")]
    pub echo_command_on_error: bool,
}

impl GenerateConfig {
    /// Create a config for the given executable with every other field defaulted
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            model: default_model(),
            adapter_path: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: default_temperature(),
            top_p: default_top_p(),
            seed: default_seed(),
            executable: executable.into(),
            extra_args: Vec::new(),
            echo_command_on_error: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_adapter_path(mut self, adapter_path: Option<PathBuf>) -> Self {
        self.adapter_path = adapter_path;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Append one extra flag
    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Append several extra flags, keeping their order
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_echo_command_on_error(mut self, echo: bool) -> Self {
        self.echo_command_on_error = echo;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executable.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "executable".to_string(),
            });
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            });
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_tokens".to_string(),
                value: "0 (must be positive)".to_string(),
            });
        }

        if let Some(temp) = self.temperature {
            if !temp.is_finite() || temp < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "temperature".to_string(),
                    value: format!("{} (must be a finite non-negative number)", temp),
                });
            }
        }

        if let Some(top_p) = self.top_p {
            if !(top_p > 0.0 && top_p <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field: "top_p".to_string(),
                    value: format!("{} (must be in (0, 1])", top_p),
                });
            }
        }

        if let Some(adapter) = &self.adapter_path {
            if adapter.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "adapter_path".to_string(),
                    value: "\"\" (omit the field instead)".to_string(),
                });
            }
        }

        Ok(())
    }
}
