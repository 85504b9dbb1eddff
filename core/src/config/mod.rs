//! Minimal configuration module for stylegen core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    GenerateConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SEED, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P,
};
