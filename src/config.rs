use clap::{ArgAction, Parser, ValueHint};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,      // e.g., "info" | "debug"
    /// face geometry & frame output
    pub display: Option<DisplayConfig>,
    /// calendar feed intake
    pub feed: Option<FeedConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// PNG path the latest composed frame is written to; omit for log-only
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedConfig {
    /// Sync payload file published by the calendar collaborator
    pub payload_path: Option<PathBuf>,
    /// Poll interval in seconds
    pub poll_secs: Option<u64>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "glanceface", about = "GlanceFace calendar watch face", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    /// Write the latest composed frame to this PNG path
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    /// Sync payload file to poll for event batches
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub feed_file: Option<PathBuf>,
    #[arg(long)]
    pub feed_poll_secs: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    load_with(cli)
}

pub fn load_with(cli: Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/glanceface/config.yaml
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        let p = home.join(".config/glanceface/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/glanceface.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["glanceface.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.feed, src.feed) {
        (None, Some(c)) => dst.feed = Some(c),
        (Some(d), Some(s)) => merge_feed(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()  { dst.width = src.width; }
    if src.height.is_some() { dst.height = src.height; }
    if src.output.is_some() { dst.output = src.output; }
}

fn merge_feed(dst: &mut FeedConfig, src: FeedConfig) {
    if src.payload_path.is_some() { dst.payload_path = src.payload_path; }
    if src.poll_secs.is_some()    { dst.poll_secs = src.poll_secs; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.output.is_some();
    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if cli.output.is_some()         { display.output = cli.output.clone(); }
    }

    let any_feed = cli.feed_file.is_some() || cli.feed_poll_secs.is_some();
    if any_feed && cfg.feed.is_none() {
        cfg.feed = Some(FeedConfig::default());
    }
    if let Some(feed) = cfg.feed.as_mut() {
        if cli.feed_file.is_some()      { feed.payload_path = cli.feed_file.clone(); }
        if cli.feed_poll_secs.is_some() { feed.poll_secs = cli.feed_poll_secs; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if let (Some(w), Some(h)) = (display.width, display.height) {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation("display width/height must be > 0".into()));
            }
        }
    }
    if let Some(feed) = cfg.feed.as_ref() {
        if feed.poll_secs == Some(0) {
            return Err(ConfigError::Validation("feed poll_secs must be > 0".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_none() -> Cli {
        Cli {
            config: None,
            log_level: None,
            display_width: None,
            display_height: None,
            output: None,
            feed_file: None,
            feed_poll_secs: None,
            dump_config: false,
        }
    }

    #[test]
    fn cli_overrides_create_sections() {
        let mut cfg = Config::default();
        let mut cli = cli_none();
        cli.display_width = Some(320);
        cli.feed_file = Some(PathBuf::from("/tmp/events.json"));
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.display.as_ref().unwrap().width, Some(320));
        assert_eq!(
            cfg.feed.as_ref().unwrap().payload_path,
            Some(PathBuf::from("/tmp/events.json"))
        );
    }

    #[test]
    fn merge_prefers_incoming_options() {
        let mut dst = Config {
            log_level: Some("info".into()),
            display: Some(DisplayConfig { width: Some(400), height: Some(400), output: None }),
            feed: None,
        };
        let src = Config {
            log_level: Some("debug".into()),
            display: Some(DisplayConfig { width: Some(320), height: None, output: None }),
            feed: Some(FeedConfig { payload_path: None, poll_secs: Some(30) }),
        };
        merge(&mut dst, src);
        assert_eq!(dst.log_level.as_deref(), Some("debug"));
        assert_eq!(dst.display.as_ref().unwrap().width, Some(320));
        assert_eq!(dst.display.as_ref().unwrap().height, Some(400));
        assert_eq!(dst.feed.as_ref().unwrap().poll_secs, Some(30));
    }

    #[test]
    fn zero_bounds_rejected() {
        let cfg = Config {
            log_level: None,
            display: Some(DisplayConfig { width: Some(0), height: Some(400), output: None }),
            feed: None,
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_poll_rejected() {
        let cfg = Config {
            log_level: None,
            display: None,
            feed: Some(FeedConfig { payload_path: None, poll_secs: Some(0) }),
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }
}
