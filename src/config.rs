//! Configuration for scriptbot paths and tuning.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SCRIPTBOT_RAW_DIR, SCRIPTBOT_CORPUS, SCRIPTBOT_CREDENTIALS)
//! 2. Config file (.scriptbot/config.yaml)
//! 3. Defaults (relative to the current directory)
//!
//! Config file discovery:
//! - Searches current directory and parents for .scriptbot/config.yaml
//! - Paths in config file are relative to the project root (parent of .scriptbot/)

pub mod credentials;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::tweet::TweetSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".scriptbot";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
    #[serde(default)]
    pub tweet: Option<TweetConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Directory of raw transcripts
    pub raw: Option<String>,
    /// Corpus output file
    pub corpus: Option<String>,
    /// Twitter credentials (JSON)
    pub credentials: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub binary: Option<String>,
    pub workdir: Option<String>,
    pub script: Option<String>,
    pub checkpoint: Option<String>,
    pub sample_length: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetConfig {
    pub interval_hours: Option<u64>,
    pub max_attempts: Option<u32>,
    pub max_chars: Option<usize>,
}

/// How to run the text generator
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Interpreter binary (`th`)
    pub binary: String,
    /// Working directory for the generator (char-rnn checkout)
    pub workdir: PathBuf,
    /// Sampling script
    pub script: PathBuf,
    /// Model checkpoint
    pub checkpoint: PathBuf,
    /// Characters requested per sample
    pub sample_length: usize,
    /// Upper bound on one sample run
    pub timeout: Duration,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Raw transcript directory
    pub raw_dir: PathBuf,
    /// Corpus output file
    pub corpus_path: PathBuf,
    /// Credentials file
    pub credentials_path: PathBuf,
    /// Generator settings
    pub generator: GeneratorSettings,
    /// Tweet loop settings
    pub tweet: TweetSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching a directory and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Convert `tweet.interval_hours` to a non-zero duration
fn interval_from_hours(hours: u64) -> Result<Duration> {
    if hours == 0 {
        bail!("tweet.interval_hours must be at least 1");
    }
    match hours.checked_mul(60 * 60) {
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => bail!("tweet.interval_hours is too large: {}", hours),
    }
}

/// Resolve settings against a base directory, filling in defaults
fn resolve(
    base: &Path,
    file: Option<ConfigFile>,
    config_file: Option<PathBuf>,
) -> Result<ResolvedConfig> {
    let (paths, generator, tweet) = match file {
        Some(file) => (file.paths, file.generator, file.tweet),
        None => (PathsConfig::default(), None, None),
    };

    let path_or = |value: &Option<String>, default: &str| {
        resolve_path(base, value.as_deref().unwrap_or(default))
    };

    let workdir = path_or(
        &generator.as_ref().and_then(|g| g.workdir.clone()),
        "lib/char-rnn",
    );
    let script = match generator.as_ref().and_then(|g| g.script.as_deref()) {
        Some(script) => resolve_path(base, script),
        None => workdir.join("sample.lua"),
    };

    let tweet_defaults = TweetSettings::default();
    let generator_settings = GeneratorSettings {
        binary: generator
            .as_ref()
            .and_then(|g| g.binary.clone())
            .unwrap_or_else(|| "th".to_string()),
        script,
        checkpoint: path_or(
            &generator.as_ref().and_then(|g| g.checkpoint.clone()),
            "data/checkpoint.t7",
        ),
        workdir,
        sample_length: generator
            .as_ref()
            .and_then(|g| g.sample_length)
            .unwrap_or(tweet_defaults.sample_length),
        timeout: Duration::from_secs(
            generator
                .as_ref()
                .and_then(|g| g.timeout_seconds)
                .unwrap_or(300),
        ),
    };

    let tweet_settings = TweetSettings {
        sample_length: generator_settings.sample_length,
        max_attempts: tweet
            .as_ref()
            .and_then(|t| t.max_attempts)
            .unwrap_or(tweet_defaults.max_attempts),
        interval: match tweet.as_ref().and_then(|t| t.interval_hours) {
            Some(hours) => interval_from_hours(hours)?,
            None => tweet_defaults.interval,
        },
        max_chars: tweet
            .as_ref()
            .and_then(|t| t.max_chars)
            .unwrap_or(tweet_defaults.max_chars),
    };

    Ok(ResolvedConfig {
        raw_dir: path_or(&paths.raw, "data/raw/tng"),
        corpus_path: path_or(&paths.corpus, "data/input.txt"),
        credentials_path: path_or(&paths.credentials, "secret/twitter-keys.json"),
        generator: generator_settings,
        tweet: tweet_settings,
        config_file,
    })
}

/// Load configuration from the config file found at or above `start`
pub fn load_config_from(start: &Path) -> Result<ResolvedConfig> {
    match find_config_file(start) {
        Some(config_path) => {
            let file = load_config_file(&config_path)?;

            // Base directory is the parent of .scriptbot/ (i.e., grandparent of config.yaml)
            let base_dir = config_path
                .parent()
                .and_then(|p| p.parent())
                .unwrap_or(start)
                .to_path_buf();

            resolve(&base_dir, Some(file), Some(config_path.clone()))
                .with_context(|| format!("Invalid config file: {}", config_path.display()))
        }
        None => resolve(start, None, None),
    }
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut ResolvedConfig) {
    if let Ok(raw) = std::env::var("SCRIPTBOT_RAW_DIR") {
        config.raw_dir = PathBuf::from(raw);
    }
    if let Ok(corpus) = std::env::var("SCRIPTBOT_CORPUS") {
        config.corpus_path = PathBuf::from(corpus);
    }
    if let Ok(credentials) = std::env::var("SCRIPTBOT_CREDENTIALS") {
        config.credentials_path = PathBuf::from(credentials);
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let mut config = load_config_from(&cwd)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
