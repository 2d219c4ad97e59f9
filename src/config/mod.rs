use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub templates_dir: String,
    pub output_dir: String,
    pub frontend_dir: String,
    pub llm_api_base: String,
    pub llm_model: String,
    pub llm_api_key: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            templates_dir: get_env("TEMPLATES_DIR", "config_templates"),
            output_dir: get_env("OUTPUT_DIR", "output"),
            frontend_dir: get_env("FRONTEND_DIR", "static"),
            llm_api_base: get_env("LLM_API_BASE", "https://api.openai.com/v1"),
            llm_model: get_env("LLM_MODEL", "gpt-4o-mini"),
            llm_api_key: get_env("LLM_API_KEY", ""),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
