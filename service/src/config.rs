use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default number of linking attempts made for a single webhook delivery.
pub const DEFAULT_WEBHOOK_MAX_ATTEMPTS: u32 = 3;

/// Default wall-clock budget for the whole linking sequence, in milliseconds.
pub const DEFAULT_WEBHOOK_DEADLINE_MS: u64 = 3000;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Shared secret the insurance provider uses to sign webhook deliveries (HMAC-SHA256).
    #[arg(long, env, hide_env_values = true)]
    insurance_webhook_secret: Option<String>,

    /// Total number of attempts made to link a claim to an estimate before giving up.
    #[arg(long, env, default_value_t = DEFAULT_WEBHOOK_MAX_ATTEMPTS)]
    pub webhook_max_attempts: u32,

    /// Backoff delays in milliseconds between linking attempts. When fewer delays than
    /// retries are given, the last delay is reused.
    #[arg(long, env, value_delimiter = ',', default_value = "100,200,400")]
    pub webhook_retry_delays_ms: Vec<u64>,

    /// Overall deadline in milliseconds for linking a claim, across all attempts.
    #[arg(long, env, default_value_t = DEFAULT_WEBHOOK_DEADLINE_MS)]
    pub webhook_deadline_ms: u64,

    /// Optional JSON file containing an array of estimates to preload into the estimate store.
    #[arg(long, env)]
    estimates_seed_file: Option<PathBuf>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the webhook signing secret, if configured. Empty values are treated as unset.
    pub fn insurance_webhook_secret(&self) -> Option<String> {
        self.insurance_webhook_secret
            .as_ref()
            .filter(|secret| !secret.is_empty())
            .cloned()
    }

    /// Returns the configured backoff schedule between linking attempts.
    pub fn webhook_retry_delays(&self) -> Vec<Duration> {
        self.webhook_retry_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    /// Returns the overall deadline for linking a claim.
    pub fn webhook_deadline(&self) -> Duration {
        Duration::from_millis(self.webhook_deadline_ms)
    }

    pub fn estimates_seed_file(&self) -> Option<&Path> {
        self.estimates_seed_file.as_deref()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }
}
