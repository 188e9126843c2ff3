use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

const CONFIG_FILE: &str = "tt-cli.toml";
const API_URL_VAR: &str = "TT_API_URL";
const TOKEN_VAR: &str = "TT_TOKEN";

/// Application configuration loaded from tt-cli.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_preferences_file")]
    pub preferences_file: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Session token to start with, replacing the persisted one
    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api/".to_string()
}

fn default_preferences_file() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".tt-cli").join("preferences.json"),
        None => env::temp_dir().join("tt-cli").join("preferences.json"),
    }
}

fn default_page_size() -> u32 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            preferences_file: default_preferences_file(),
            page_size: default_page_size(),
            token: None,
        }
    }
}

impl Config {
    /// Load config from CWD first, then home directory, or use defaults;
    /// environment variables win over the file
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_overrides(|name| env::var(name).ok());
        config
    }

    fn load_file() -> Self {
        if let Ok(content) = std::fs::read_to_string(CONFIG_FILE)
            && let Ok(config) = toml::from_str(&content)
        {
            log::debug!("Loaded config from {}", CONFIG_FILE);
            return config;
        }

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home).join(format!(".{}", CONFIG_FILE));
            if let Ok(content) = std::fs::read_to_string(&home_config)
                && let Ok(config) = toml::from_str(&content)
            {
                log::debug!("Loaded config from {}", home_config.display());
                return config;
            }
        }

        log::debug!("Using default config");
        Self::default()
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_VAR).filter(|url| !url.is_empty()) {
            log::debug!("{} overrides api_base_url", API_URL_VAR);
            self.api_base_url = url;
        }
        if let Some(token) = lookup(TOKEN_VAR).filter(|token| !token.is_empty()) {
            self.token = Some(token);
        }
    }
}
