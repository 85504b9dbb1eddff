//! Simple CLI configuration loader for stylegen
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./stylegen.json or ./.stylegen/config.json
//! 3. Git repository root: <repo_root>/.stylegen/config.json
//! 4. XDG config: $XDG_CONFIG_HOME/stylegen/config.json or ~/.config/stylegen/config.json
//! 5. No file at all
//!
//! `STYLEGEN_EXECUTABLE`, `STYLEGEN_MODEL` and `STYLEGEN_ADAPTER_PATH` fill
//! fields the file leaves out. Flags override everything.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use stylegen_core::GenerateConfig;
use tracing::{debug, warn};

/// Keep `null` distinct from a missing key: `Some(None)` means "omit the flag"
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Raw configuration file format; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Interpreter hosting mlx_lm (may use `~` and `$VAR`)
    pub executable: Option<String>,
    pub model: Option<String>,
    pub adapter_path: Option<String>,
    pub max_tokens: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub temperature: Option<Option<f32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub top_p: Option<Option<f32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub seed: Option<Option<u64>>,
    #[serde(default)]
    pub extra_args: Vec<String>,
    pub echo_command_on_error: Option<bool>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Directory searched instead of the working directory
    search_root: Option<PathBuf>,
    /// Directory used instead of the XDG config home
    xdg_config_override: Option<PathBuf>,
    /// Flag overrides
    executable_override: Option<String>,
    model_override: Option<String>,
    adapter_path_override: Option<PathBuf>,
    max_tokens_override: Option<u32>,
    temperature_override: Option<f32>,
    top_p_override: Option<f32>,
    seed_override: Option<Option<u64>>,
    extra_args: Vec<String>,
    no_echo_command: bool,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            search_root: None,
            xdg_config_override: None,
            executable_override: None,
            model_override: None,
            adapter_path_override: None,
            max_tokens_override: None,
            temperature_override: None,
            top_p_override: None,
            seed_override: None,
            extra_args: Vec::new(),
            no_echo_command: false,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Search this directory instead of the current working directory
    #[cfg(test)]
    pub fn with_search_root(mut self, path: PathBuf) -> Self {
        self.search_root = Some(path);
        self
    }

    /// Use this directory instead of the XDG config home
    #[cfg(test)]
    pub fn with_xdg_config_dir(mut self, path: PathBuf) -> Self {
        self.xdg_config_override = Some(path);
        self
    }

    pub fn with_executable_override(mut self, executable: String) -> Self {
        self.executable_override = Some(executable);
        self
    }

    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    pub fn with_adapter_path_override(mut self, path: PathBuf) -> Self {
        self.adapter_path_override = Some(path);
        self
    }

    pub fn with_max_tokens_override(mut self, max_tokens: u32) -> Self {
        self.max_tokens_override = Some(max_tokens);
        self
    }

    pub fn with_temperature_override(mut self, temperature: f32) -> Self {
        self.temperature_override = Some(temperature);
        self
    }

    pub fn with_top_p_override(mut self, top_p: f32) -> Self {
        self.top_p_override = Some(top_p);
        self
    }

    /// `None` clears the seed so generation is non-deterministic
    pub fn with_seed_override(mut self, seed: Option<u64>) -> Self {
        self.seed_override = Some(seed);
        self
    }

    /// Append extra flags after the ones from the config file
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    pub fn with_no_echo_command(mut self, no_echo: bool) -> Self {
        self.no_echo_command = no_echo;
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<GenerateConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?.unwrap_or_default()
        };

        // Step 2: Environment fills the gaps
        self.apply_env_fallbacks(&mut config);

        // Step 3: Apply flag overrides
        if let Some(executable) = &self.executable_override {
            config.executable = Some(executable.clone());
        }
        if let Some(model) = &self.model_override {
            config.model = Some(model.clone());
        }
        if let Some(adapter_path) = &self.adapter_path_override {
            config.adapter_path = Some(adapter_path.display().to_string());
        }
        if let Some(max_tokens) = self.max_tokens_override {
            config.max_tokens = Some(max_tokens);
        }
        if let Some(temperature) = self.temperature_override {
            config.temperature = Some(Some(temperature));
        }
        if let Some(top_p) = self.top_p_override {
            config.top_p = Some(Some(top_p));
        }
        if let Some(seed) = self.seed_override {
            config.seed = Some(seed);
        }
        config.extra_args.extend(self.extra_args.iter().cloned());
        if self.no_echo_command {
            config.echo_command_on_error = Some(false);
        }

        // Step 4: Resolve to final generation config
        self.resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<RawConfig>> {
        let root = match &self.search_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };

        // 1. Working directory
        for candidate in [
            root.join("stylegen.json"),
            root.join(".stylegen").join("config.json"),
        ] {
            if candidate.exists() {
                return Ok(Some(self.load_file(&candidate).await?));
            }
        }

        // 2. Git repository root
        if let Some(git_root) = find_git_root(&root) {
            let config_path = git_root.join(".stylegen").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }

        // 3. XDG config directory
        if let Some(config_dir) = self.get_xdg_config_dir() {
            let config_path = config_dir.join("stylegen").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }

        debug!("no stylegen config file found, using flags and environment only");
        Ok(None)
    }

    fn apply_env_fallbacks(&self, config: &mut RawConfig) {
        if config.executable.is_none() {
            config.executable = std::env::var("STYLEGEN_EXECUTABLE").ok();
        }
        if config.model.is_none() {
            config.model = std::env::var("STYLEGEN_MODEL").ok();
        }
        if config.adapter_path.is_none() {
            config.adapter_path = std::env::var("STYLEGEN_ADAPTER_PATH").ok();
        }
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        debug!(path = %path.display(), "loading config file");
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get XDG config directory
    fn get_xdg_config_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.xdg_config_override {
            return Some(dir.clone());
        }
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg_config))
        } else {
            dirs::home_dir().map(|home| home.join(".config"))
        }
    }

    /// Resolve raw config to GenerateConfig
    fn resolve_config(&self, config: RawConfig) -> Result<GenerateConfig> {
        let executable = config.executable.ok_or_else(|| {
            anyhow!(
                "No executable configured. Set \"executable\" in stylegen.json, \
                 pass --executable, or set STYLEGEN_EXECUTABLE"
            )
        })?;
        let executable = expand_path(&executable)?;
        check_executable(&executable);

        let mut resolved = GenerateConfig::new(executable).with_extra_args(config.extra_args);

        if let Some(model) = config.model {
            resolved = resolved.with_model(model);
        }
        if let Some(adapter_path) = config.adapter_path {
            resolved = resolved.with_adapter_path(Some(PathBuf::from(expand_path(&adapter_path)?)));
        }
        if let Some(max_tokens) = config.max_tokens {
            resolved = resolved.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = config.temperature {
            resolved = resolved.with_temperature(temperature);
        }
        if let Some(top_p) = config.top_p {
            resolved = resolved.with_top_p(top_p);
        }
        if let Some(seed) = config.seed {
            resolved = resolved.with_seed(seed);
        }
        if let Some(echo) = config.echo_command_on_error {
            resolved = resolved.with_echo_command_on_error(echo);
        }

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the enclosing git repository root
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Expand `~` and environment variables
fn expand_path(value: &str) -> Result<String> {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .with_context(|| format!("Failed to expand path: {}", value))
}

/// Warn early when a bare executable name is not on PATH
fn check_executable(executable: &str) {
    if executable.contains(std::path::MAIN_SEPARATOR) || executable.contains('/') {
        return;
    }
    match which::which(executable) {
        Ok(path) => debug!(executable, resolved = %path.display(), "executable found on PATH"),
        Err(_) => warn!(executable, "executable not found on PATH"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn isolated_loader(root: &Path) -> CliConfigLoader {
        CliConfigLoader::new()
            .with_search_root(root.to_path_buf())
            .with_xdg_config_dir(root.join("xdg"))
    }

    #[tokio::test]
    async fn test_loads_working_directory_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("stylegen.json"),
            r#"{
                "executable": "/opt/venv/bin/python",
                "model": "mlx-community/Qwen2.5-7B",
                "max_tokens": 64,
                "seed": null,
                "extra_args": ["--ignore-chat-template"]
            }"#,
        )
        .unwrap();

        let config = isolated_loader(dir.path()).load().await.unwrap();

        assert_eq!(config.executable, "/opt/venv/bin/python");
        assert_eq!(config.model, "mlx-community/Qwen2.5-7B");
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.seed, None);
        // keys left out keep their defaults
        assert_eq!(config.temperature, Some(0.6));
        assert_eq!(config.extra_args, vec!["--ignore-chat-template"]);
    }

    #[tokio::test]
    async fn test_dot_dir_and_xdg_fallbacks() {
        let dir = tempdir().unwrap();
        let xdg = dir.path().join("xdg").join("stylegen");
        std::fs::create_dir_all(&xdg).unwrap();
        std::fs::write(xdg.join("config.json"), r#"{"executable": "/xdg/python"}"#).unwrap();

        let config = isolated_loader(dir.path()).load().await.unwrap();
        assert_eq!(config.executable, "/xdg/python");

        let dot_dir = dir.path().join(".stylegen");
        std::fs::create_dir_all(&dot_dir).unwrap();
        std::fs::write(dot_dir.join("config.json"), r#"{"executable": "/local/python"}"#)
            .unwrap();

        let config = isolated_loader(dir.path()).load().await.unwrap();
        assert_eq!(config.executable, "/local/python");
    }

    #[tokio::test]
    async fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        std::fs::write(
            &config_path,
            r#"{"executable": "/file/python", "temperature": 0.2, "extra_args": ["--a"]}"#,
        )
        .unwrap();

        let config = isolated_loader(dir.path())
            .with_config_override(config_path)
            .with_executable_override("/flag/python".to_string())
            .with_temperature_override(0.9)
            .with_seed_override(None)
            .with_extra_args(vec!["--b".to_string()])
            .with_no_echo_command(true)
            .load()
            .await
            .unwrap();

        assert_eq!(config.executable, "/flag/python");
        assert_eq!(config.temperature, Some(0.9));
        assert_eq!(config.seed, None);
        assert_eq!(config.extra_args, vec!["--a", "--b"]);
        assert!(!config.echo_command_on_error);
    }

    #[tokio::test]
    async fn test_config_directory_override() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"executable": "/dir/python", "adapter_path": "adapters/cams_formal"}"#,
        )
        .unwrap();

        let config = isolated_loader(dir.path())
            .with_config_override(dir.path().to_path_buf())
            .load()
            .await
            .unwrap();

        assert_eq!(config.executable, "/dir/python");
        assert_eq!(
            config.adapter_path,
            Some(PathBuf::from("adapters/cams_formal"))
        );
    }

    #[tokio::test]
    async fn test_missing_override_path_fails() {
        let dir = tempdir().unwrap();
        let result = isolated_loader(dir.path())
            .with_config_override(dir.path().join("nope.json"))
            .load()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let result = isolated_loader(dir.path())
            .with_executable_override("/opt/python".to_string())
            .with_max_tokens_override(0)
            .load()
            .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("max_tokens"), "{}", err);
    }

    #[tokio::test]
    async fn test_unknown_keys_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("stylegen.json"),
            r#"{"executable": "/opt/python", "temp": 0.3}"#,
        )
        .unwrap();

        assert!(isolated_loader(dir.path()).load().await.is_err());
    }

    #[test]
    fn test_expand_path_home() {
        let home = dirs::home_dir().unwrap();
        let expanded = expand_path("~/venv/bin/python").unwrap();
        assert_eq!(PathBuf::from(expanded), home.join("venv/bin/python"));
    }

    #[test]
    fn test_find_git_root() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_git_root(&nested), Some(dir.path().to_path_buf()));
    }
}
