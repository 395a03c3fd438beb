//! Runtime configuration.
//!
//! Layered load: built-in defaults, then an optional TOML config file
//! (`DOCENT_CONFIG` path override, else `<config_dir>/docent/config.toml`),
//! then environment variables. All file fields are optional so partial
//! configs merge over the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Resolved service configuration.
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Address the HTTP server binds, e.g. "0.0.0.0:8000".
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    /// Character budget of document text fed to summarization.
    pub summary_input_chars: usize,
    /// Character budget of document text in the answer context window.
    pub answer_context_chars: usize,
    /// Trailing prior messages included in the answer context.
    pub history_window: usize,
    /// Default result count for search when the request doesn't set one.
    pub search_top_k: usize,
    /// Timeout for outbound model API calls.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            bind_addr: "0.0.0.0:8000".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            summary_input_chars: 4000,
            answer_context_chars: 3000,
            history_window: 3,
            search_top_k: 3,
            request_timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "gemini_api_key",
                &if self.gemini_api_key.is_empty() {
                    "<unset>"
                } else {
                    "***"
                },
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("bind_addr", &self.bind_addr)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("summary_input_chars", &self.summary_input_chars)
            .field("answer_context_chars", &self.answer_context_chars)
            .field("history_window", &self.history_window)
            .field("search_top_k", &self.search_top_k)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub gemini: Option<GeminiConfig>,
    pub server: Option<ServerConfig>,
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: Option<String>,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub summary_input_chars: Option<usize>,
    pub answer_context_chars: Option<usize>,
    pub history_window: Option<usize>,
    pub search_top_k: Option<usize>,
}

/// Platform config file path: `<config_dir>/docent/config.toml`,
/// unless `DOCENT_CONFIG` names an explicit path.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DOCENT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("docent").join("config.toml"))
}

/// Load a config file from a specific path. Returns `None` if the file
/// doesn't exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

impl Config {
    /// Defaults ← config file ← environment.
    pub fn load() -> Self {
        let mut config = Config::default();
        if let Some(path) = config_path()
            && let Some(file) = load_from_path(&path)
        {
            tracing::info!(path = %path.display(), "loaded config file");
            config.apply_file(file);
        }
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    /// Overlay file values onto the current config.
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(gemini) = file.gemini {
            if let Some(v) = gemini.api_key {
                self.gemini_api_key = v;
            }
            if let Some(v) = gemini.model {
                self.gemini_model = v;
            }
            if let Some(v) = gemini.base_url {
                self.gemini_base_url = v;
            }
            if let Some(v) = gemini.request_timeout_secs {
                self.request_timeout_secs = v;
            }
        }
        if let Some(server) = file.server {
            if let Some(v) = server.bind_addr {
                self.bind_addr = v;
            }
            if let Some(v) = server.max_upload_bytes {
                self.max_upload_bytes = v;
            }
        }
        if let Some(limits) = file.limits {
            if let Some(v) = limits.summary_input_chars {
                self.summary_input_chars = v;
            }
            if let Some(v) = limits.answer_context_chars {
                self.answer_context_chars = v;
            }
            if let Some(v) = limits.history_window {
                self.history_window = v;
            }
            if let Some(v) = limits.search_top_k {
                self.search_top_k = v;
            }
        }
    }

    /// Overlay environment values. `GEMINI_API_KEY` sets the API key,
    /// `DOCENT_BIND` the full bind address, `PORT` just the port.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini_api_key = key;
        }
        if let Some(bind) = get("DOCENT_BIND") {
            self.bind_addr = bind;
        }
        if let Some(port) = get("PORT")
            && port.parse::<u16>().is_ok()
        {
            let host = self
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            self.bind_addr = format!("{host}:{port}");
        }
    }
}
