//! Runtime configuration from the environment (and `.env`), with command
//! line overrides.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use timeliner_kernel::EditorConfig;

use crate::cli::Args;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub data_dir: PathBuf,
    pub editor: EditorConfig,
}

impl Config {
    /// Load from the process environment after reading `.env`, if any.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut editor = EditorConfig::default();
        if let Some(ms) = get("TIMELINER_SAVE_DEBOUNCE_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("TIMELINER_SAVE_DEBOUNCE_MS must be milliseconds, got {ms:?}"))?;
            editor.save_debounce = Duration::from_millis(ms);
        }
        if let Some(flag) = get("TIMELINER_PRUNE_COLUMNS") {
            editor.prune_empty_columns = parse_flag(&flag)
                .with_context(|| format!("TIMELINER_PRUNE_COLUMNS must be a boolean, got {flag:?}"))?;
        }

        Ok(Self {
            api_url: get("TIMELINER_API_URL"),
            token: get("TIMELINER_TOKEN"),
            data_dir: get("TIMELINER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            editor,
        })
    }

    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(url) = &args.api_url {
            self.api_url = Some(url.clone());
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if args.offline {
            self.api_url = None;
        }
        self
    }

    /// A backend is used only when both its URL and a token are known.
    pub fn backend(&self) -> Option<(&str, &str)> {
        Some((self.api_url.as_deref()?, self.token.as_deref()?))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("timeliner"))
        .unwrap_or_else(|| PathBuf::from(".timeliner"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
