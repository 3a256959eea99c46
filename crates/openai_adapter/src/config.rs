use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Adapter configuration, loaded in layers: `~/.todo-copilot/config.json`
/// first, `./config.toml` as a fallback, environment variables last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub http_proxy_auth: Option<ProxyAuth>,
    #[serde(default)]
    pub https_proxy_auth: Option<ProxyAuth>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

const CONFIG_FILE_PATH: &str = "config.toml";

fn app_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".todo-copilot")
}

fn app_config_json_path() -> PathBuf {
    app_dir().join("config.json")
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let mut config = Self::load_from_files();
        config.apply_env_overrides();
        config
    }

    /// Configuration with nothing set. Callers fill in what they need.
    pub fn empty() -> Self {
        Config {
            http_proxy: String::new(),
            https_proxy: String::new(),
            http_proxy_auth: None,
            https_proxy_auth: None,
            api_key: None,
            api_base: None,
            model: None,
        }
    }

    fn load_from_files() -> Self {
        let json_path = app_config_json_path();
        if json_path.exists() {
            if let Ok(content) = std::fs::read_to_string(&json_path) {
                if let Ok(file_config) = serde_json::from_str::<Config>(&content) {
                    return file_config;
                }
            }
        }

        if std::path::Path::new(CONFIG_FILE_PATH).exists() {
            if let Ok(content) = std::fs::read_to_string(CONFIG_FILE_PATH) {
                if let Ok(file_config) = toml::from_str::<Config>(&content) {
                    return file_config;
                }
            }
        }

        Self::empty()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(http_proxy) = std::env::var("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Ok(https_proxy) = std::env::var("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Ok(api_base) = std::env::var("OPENAI_API_BASE") {
            self.api_base = Some(api_base);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.model = Some(model);
        }
    }
}
