use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::app::WatchfaceSettings;
use crate::clock::ClockStyle;
use crate::constants::{
    APP_MESSAGE_INBOX_SIZE_MAXIMUM, APP_MESSAGE_OUTBOX_SIZE_MAXIMUM, DEFAULT_WEATHER_INTERVAL_MINS,
};
use crate::host::default_storage_path;

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

/// Top-level app configuration. Every field is optional so layers can be merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub clock_format: Option<ClockStyle>,
    /// ask the companion for weather every N minutes
    pub weather_interval_mins: Option<u32>,
    /// where the theme preference is persisted
    pub storage_path: Option<PathBuf>,
    pub channel: Option<ChannelConfig>,
    pub display: Option<DisplayConfig>,
}

/// Companion link buffer sizes, in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub inbox_size: Option<usize>,
    pub outbox_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    /// rewrite each frame to this PBM file
    pub snapshot: Option<PathBuf>,
    /// PBM image replacing the drawn spark background
    pub background: Option<PathBuf>,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn clock_style(&self) -> ClockStyle {
        self.clock_format.unwrap_or_default()
    }

    pub fn weather_interval_mins(&self) -> u32 {
        self.weather_interval_mins.unwrap_or(DEFAULT_WEATHER_INTERVAL_MINS)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(default_storage_path)
    }

    pub fn inbox_size(&self) -> usize {
        self.channel
            .as_ref()
            .and_then(|c| c.inbox_size)
            .unwrap_or(APP_MESSAGE_INBOX_SIZE_MAXIMUM)
    }

    pub fn outbox_size(&self) -> usize {
        self.channel
            .as_ref()
            .and_then(|c| c.outbox_size)
            .unwrap_or(APP_MESSAGE_OUTBOX_SIZE_MAXIMUM)
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.display.as_ref().and_then(|d| d.snapshot.clone())
    }

    pub fn background_path(&self) -> Option<PathBuf> {
        self.display.as_ref().and_then(|d| d.background.clone())
    }

    pub fn watchface_settings(&self) -> WatchfaceSettings {
        WatchfaceSettings {
            weather_interval_mins: self.weather_interval_mins(),
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "sparkface", about = "Spark watchface", version, disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// shorthand for --log-level debug
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long, value_enum)]
    pub clock_format: Option<ClockStyle>,
    #[arg(long)]
    pub weather_interval_mins: Option<u32>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub storage_path: Option<PathBuf>,
    #[arg(long)]
    pub inbox_size: Option<usize>,
    #[arg(long)]
    pub outbox_size: Option<usize>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub background: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, YAML and `cli`, then validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
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
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/sparkface/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/sparkface/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/sparkface.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["sparkface.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()             { dst.log_level = src.log_level; }
    if src.clock_format.is_some()          { dst.clock_format = src.clock_format; }
    if src.weather_interval_mins.is_some() { dst.weather_interval_mins = src.weather_interval_mins; }
    if src.storage_path.is_some()          { dst.storage_path = src.storage_path; }
    // channel
    match (&mut dst.channel, src.channel) {
        (None, Some(c)) => dst.channel = Some(c),
        (Some(d), Some(s)) => merge_channel(d, s),
        _ => {}
    }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_channel(dst: &mut ChannelConfig, src: ChannelConfig) {
    if src.inbox_size.is_some()  { dst.inbox_size = src.inbox_size; }
    if src.outbox_size.is_some() { dst.outbox_size = src.outbox_size; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.snapshot.is_some()   { dst.snapshot = src.snapshot; }
    if src.background.is_some() { dst.background = src.background; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()             { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                           { cfg.log_level = Some("debug".into()); }
    if cli.clock_format.is_some()          { cfg.clock_format = cli.clock_format; }
    if cli.weather_interval_mins.is_some() { cfg.weather_interval_mins = cli.weather_interval_mins; }
    if cli.storage_path.is_some()          { cfg.storage_path = cli.storage_path.clone(); }

    if (cli.inbox_size.is_some() || cli.outbox_size.is_some()) && cfg.channel.is_none() {
        cfg.channel = Some(ChannelConfig::default());
    }
    if let Some(channel) = cfg.channel.as_mut() {
        if cli.inbox_size.is_some()  { channel.inbox_size = cli.inbox_size; }
        if cli.outbox_size.is_some() { channel.outbox_size = cli.outbox_size; }
    }

    if (cli.snapshot.is_some() || cli.background.is_some()) && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.snapshot.is_some()   { display.snapshot = cli.snapshot.clone(); }
        if cli.background.is_some() { display.background = cli.background.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        match level.to_ascii_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(ConfigError::Validation(format!("unknown log_level '{}'", level)))
        }
    }
    if let Some(mins) = cfg.weather_interval_mins {
        if !(1..=60).contains(&mins) {
            return Err(ConfigError::Validation("weather_interval_mins must be 1..=60".into()));
        }
    }
    if let Some(channel) = cfg.channel.as_ref() {
        if channel.inbox_size == Some(0) || channel.outbox_size == Some(0) {
            return Err(ConfigError::Validation("channel inbox/outbox size must be > 0".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml_file(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sparkface-{}-{}.yaml", name, std::process::id()));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.clock_style(), ClockStyle::TwentyFourHour);
        assert_eq!(cfg.weather_interval_mins(), 1);
        assert_eq!(cfg.inbox_size(), 8200);
        assert_eq!(cfg.outbox_size(), 8200);
        assert!(cfg.snapshot_path().is_none());
        assert!(cfg.storage_path().ends_with("sparkface/preferences.yaml"));
    }

    #[test]
    fn test_yaml_then_cli_precedence() {
        let path = yaml_file(
            "layers",
            "log_level: warn\nclock_format: 12h\nweather_interval_mins: 30\nchannel:\n  inbox_size: 512\n",
        );
        let cli = Cli::try_parse_from([
            "sparkface",
            "--config",
            path.to_str().unwrap(),
            "--weather-interval-mins",
            "15",
            "--outbox-size",
            "256",
        ])
        .unwrap();

        let cfg = load_from(&cli).unwrap();
        assert_eq!(cfg.log_level(), "warn");
        assert_eq!(cfg.clock_style(), ClockStyle::TwelveHour);
        assert_eq!(cfg.weather_interval_mins(), 15);
        assert_eq!(cfg.inbox_size(), 512);
        assert_eq!(cfg.outbox_size(), 256);
        assert_eq!(cfg.watchface_settings().weather_interval_mins, 15);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_debug_flag_wins() {
        let cli = Cli::try_parse_from(["sparkface", "--log-level", "warn", "--debug", "--clock-format", "12h"]).unwrap();
        let mut cfg = Config::default();
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.clock_style(), ClockStyle::TwelveHour);
    }

    #[test]
    fn test_missing_explicit_config() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/sparkface.yaml")),
            ..Default::default()
        };
        assert!(matches!(load_from(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation() {
        let bad_interval = Config { weather_interval_mins: Some(0), ..Default::default() };
        assert!(validate(&bad_interval).is_err());

        let bad_level = Config { log_level: Some("loud".into()), ..Default::default() };
        assert!(validate(&bad_level).is_err());

        let bad_channel = Config {
            channel: Some(ChannelConfig { inbox_size: Some(0), outbox_size: None }),
            ..Default::default()
        };
        assert!(validate(&bad_channel).is_err());

        let ok = Config { weather_interval_mins: Some(60), log_level: Some("TRACE".into()), ..Default::default() };
        assert!(validate(&ok).is_ok());
    }

    #[test]
    fn test_merge_nested() {
        let mut dst = Config {
            display: Some(DisplayConfig { snapshot: Some("a.pbm".into()), background: None }),
            ..Default::default()
        };
        let src = Config {
            display: Some(DisplayConfig { snapshot: None, background: Some("bg.pbm".into()) }),
            ..Default::default()
        };
        merge(&mut dst, src);
        assert_eq!(dst.snapshot_path(), Some(PathBuf::from("a.pbm")));
        assert_eq!(dst.background_path(), Some(PathBuf::from("bg.pbm")));
    }

    #[test]
    fn test_invalid_yaml() {
        let path = yaml_file("broken", "weather_interval_mins: [not, a, number]\n");
        assert!(matches!(read_yaml(&path), Err(ConfigError::Yaml(_))));
        fs::remove_file(&path).ok();
    }
}
