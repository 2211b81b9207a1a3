//! CLI-owned configuration: a flat TOML file with `PANSYNC_*` environment
//! overrides, plus credential resolution.
//!
//! The library crates never see these types -- `commands::connect`
//! translates them into a `TransportConfig` and `Credentials`.

use std::io::IsTerminal;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use pansync_xapi::Credentials;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config struct ───────────────────────────────────────────────

/// On-disk configuration. Every field has a `PANSYNC_*` environment
/// override, and the matching global flag wins over both.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Device hostname or base URL.
    pub device: Option<String>,

    /// Username for keygen authentication.
    #[serde(default = "default_username")]
    pub username: String,

    /// Pre-generated API key (plaintext -- prefer PANSYNC_API_KEY).
    pub api_key: Option<String>,

    /// Accept self-signed management certificates.
    #[serde(default)]
    pub insecure: bool,

    /// CA certificate (PEM) for verifying the management interface.
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            username: default_username(),
            api_key: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

fn default_username() -> String {
    "admin".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pansync", "pansync")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("pansync");
            p.push("config.toml");
            p
        })
}

// ── Config loading ───────────────────────────────────────────────────

/// Load configuration from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("PANSYNC_"));

    Ok(figment.extract()?)
}

/// Load config, falling back to defaults when the file is absent or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution ────────────────────────────────────────────

/// Resolve session credentials from flags, config file, and environment.
///
/// Order: `--api-key` / `PANSYNC_API_KEY`, then the config file's
/// `api_key`, then `--password` / `PANSYNC_PASSWORD`, then an interactive
/// prompt. API keys skip the keygen round trip entirely.
pub fn resolve_credentials(global: &GlobalOpts, cfg: &Config) -> Result<Credentials, CliError> {
    // 1. API key from flag or env
    if let Some(ref key) = global.api_key {
        return Ok(Credentials::ApiKey(SecretString::from(key.clone())));
    }

    // 2. API key from the config file
    if let Some(ref key) = cfg.api_key {
        return Ok(Credentials::ApiKey(SecretString::from(key.clone())));
    }

    let username = global
        .username
        .clone()
        .unwrap_or_else(|| cfg.username.clone());

    // 3. Password from flag or env
    if let Some(ref password) = global.password {
        return Ok(Credentials::Basic {
            username,
            password: SecretString::from(password.clone()),
        });
    }

    // 4. Interactive prompt
    if std::io::stdin().is_terminal() {
        let password = rpassword::prompt_password(format!("Password for {username}: "))?;
        if !password.is_empty() {
            return Ok(Credentials::Basic {
                username,
                password: SecretString::from(password),
            });
        }
    }

    Err(CliError::NoCredentials)
}
