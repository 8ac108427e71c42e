//! Runtime configuration.
//!
//! Loaded once at startup and handed to each component at construction;
//! nothing reads configuration through globals.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an assistant that helps with identifying spelling errors. You will be given a screengrab of text from while the user is working.
It may not be well-formatted. However, when you are very confident about a spelling error, write \"spelling error, <word>, <correction>\",
with each error on its own line.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Path to the capture store written by the screen-capture process.
    pub database_path: PathBuf,
    /// Lookback used by the one-shot entry point, in seconds.
    pub interval_seconds: u32,
    /// Ascending ladder of lookback intervals for the widening context search.
    pub widening_intervals: Vec<u32>,
    pub model_name: String,
    pub ollama_url: String,
    pub request_timeout_secs: u64,
    /// Fallback log filter, used when RUST_LOG is unset.
    pub log_level: String,
    /// Prompt prepended to every query.
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("db.sqlite3"),
            interval_seconds: 10,
            widening_intervals: vec![15, 30, 60, 120, 300],
            model_name: "llama3.2:3b".into(),
            ollama_url: "http://localhost:11434".into(),
            request_timeout_secs: 60,
            log_level: "info".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

impl AssistantConfig {
    /// Reads the config file, falling back to defaults when it does not
    /// exist. Absent fields take their defaults, so partial files are fine;
    /// a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }
}
