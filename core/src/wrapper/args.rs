//! Argument vector construction for `mlx_lm.generate`

use crate::config::GenerateConfig;

/// Flag that asks the interpreter to run a module
pub const MODULE_FLAG: &str = "-m";
/// Module hosting the generation command line
pub const GENERATE_MODULE: &str = "mlx_lm.generate";

pub const MODEL_FLAG: &str = "--model";
pub const MAX_TOKENS_FLAG: &str = "--max-tokens";
pub const ADAPTER_PATH_FLAG: &str = "--adapter-path";
pub const TEMPERATURE_FLAG: &str = "--temp";
pub const TOP_P_FLAG: &str = "--top-p";
pub const SEED_FLAG: &str = "--seed";
pub const PROMPT_FLAG: &str = "--prompt";

/// Build the full command line for one generation.
///
/// The order is fixed: executable, module marker, model, length cap, then the
/// optional adapter, temperature, top-p and seed flags (each only when set),
/// then `extra_args` verbatim, and `--prompt <prompt>` last. Keeping the prompt
/// last means the vector matches what a user would type by hand, and prompt
/// text that looks like a flag can never shadow a real one.
pub fn build_command_args(config: &GenerateConfig, prompt: &str) -> Vec<String> {
    let mut args = vec![
        config.executable.clone(),
        MODULE_FLAG.to_string(),
        GENERATE_MODULE.to_string(),
        MODEL_FLAG.to_string(),
        config.model.clone(),
        MAX_TOKENS_FLAG.to_string(),
        config.max_tokens.to_string(),
    ];

    if let Some(adapter_path) = &config.adapter_path {
        args.push(ADAPTER_PATH_FLAG.to_string());
        args.push(adapter_path.display().to_string());
    }

    if let Some(temp) = config.temperature {
        args.push(TEMPERATURE_FLAG.to_string());
        args.push(format_float(temp));
    }

    if let Some(top_p) = config.top_p {
        args.push(TOP_P_FLAG.to_string());
        args.push(format_float(top_p));
    }

    if let Some(seed) = config.seed {
        args.push(SEED_FLAG.to_string());
        args.push(seed.to_string());
    }

    args.extend(config.extra_args.iter().cloned());

    args.push(PROMPT_FLAG.to_string());
    args.push(prompt.to_string());

    args
}

/// Join an argument vector the way it is echoed in diagnostics
pub fn render_command_line(args: &[String]) -> String {
    args.join(" ")
}

// Debug formatting keeps the fractional part: 1.0 renders as "1.0", not "1"
fn format_float(value: f32) -> String {
    format!("{:?}", value)
}
