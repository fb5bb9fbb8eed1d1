//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Audit log snapshot persistence settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub church: ChurchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default)]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file" or "both")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix (default: "congregate")
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr) - default for development
    #[default]
    Console,
    /// Log to file with optional rotation
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "congregate".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

/// Audit log snapshot persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Mirror the audit log to `file` after every append
    #[serde(default = "default_audit_persist")]
    pub persist: bool,
    /// Snapshot location; relative paths resolve against the working directory
    #[serde(default = "default_audit_file")]
    pub file: PathBuf,
}

/// Environment name that turns persistence off by default
const TEST_ENVIRONMENT: &str = "test";

fn is_test_environment() -> bool {
    std::env::var("CONGREGATE_ENV")
        .map(|env| env.eq_ignore_ascii_case(TEST_ENVIRONMENT))
        .unwrap_or(false)
}

fn default_audit_persist() -> bool {
    !is_test_environment()
}

fn default_audit_file() -> PathBuf {
    PathBuf::from("storage/audit-log.json")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            persist: default_audit_persist(),
            file: default_audit_file(),
        }
    }
}

impl AuditConfig {
    /// Snapshot path with relative paths joined onto the working directory
    pub fn resolved_file(&self) -> PathBuf {
        resolve_against_cwd(&self.file)
    }
}

fn resolve_against_cwd(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// The tenant served by this instance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChurchConfig {
    #[serde(default = "default_church_id")]
    pub id: String,
    #[serde(default = "default_church_name")]
    pub name: String,
    #[serde(default = "default_church_timezone")]
    pub timezone: String,
}

fn default_church_id() -> String {
    "church-acc".to_string()
}

fn default_church_name() -> String {
    "Auckland Community Church".to_string()
}

fn default_church_timezone() -> String {
    "Pacific/Auckland".to_string()
}

impl Default for ChurchConfig {
    fn default() -> Self {
        Self {
            id: default_church_id(),
            name: default_church_name(),
            timezone: default_church_timezone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            audit: AuditConfig::default(),
            church: ChurchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Check for config path override from environment
        let config_path = std::env::var("CONGREGATE_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::from_file(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Current directory
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            // System config directory
            PathBuf::from("/etc/congregate/config.yaml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("congregate/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source (the process environment in production)
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(host) = lookup("CONGREGATE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CONGREGATE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CONGREGATE_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }

        // Audit snapshot overrides: anything but "false" enables persistence
        if let Some(persist) = lookup("AUDIT_LOG_PERSIST") {
            self.audit.persist = persist.trim() != "false";
        }
        if let Some(file) = lookup("AUDIT_LOG_FILE") {
            if !file.trim().is_empty() {
                self.audit.file = PathBuf::from(file.trim());
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.audit.file.as_os_str().is_empty() {
            anyhow::bail!("Audit log file path cannot be empty");
        }

        if self.church.id.trim().is_empty() {
            anyhow::bail!("Church id cannot be empty");
        }

        Ok(())
    }
}
