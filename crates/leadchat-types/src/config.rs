//! Application configuration types for leadchat.
//!
//! `AppConfig` represents the top-level `config.toml` that selects the
//! storage backend, the conversation copy and pacing, the CSV date format
//! and the default server address.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.leadchat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which repository backend stores forms and leads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// SQLite database in the data directory.
    #[default]
    Sqlite,
    /// Process-local maps; everything is lost on exit.
    Memory,
}

impl fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackendKind::Sqlite => write!(f, "sqlite"),
            StorageBackendKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackendKind::Sqlite),
            "memory" => Ok(StorageBackendKind::Memory),
            other => Err(format!("unknown storage backend: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
}

/// Language of the engine's own messages (validation, retry, action labels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pt-BR")]
    BrazilianPortuguese,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::English => write!(f, "en"),
            Locale::BrazilianPortuguese => write!(f, "pt-BR"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::English),
            "pt-br" | "pt" | "portuguese" => Ok(Locale::BrazilianPortuguese),
            other => Err(format!("unsupported locale: '{other}'")),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub pacing: ChatPacing,
}

/// Delays that simulate human turn-taking, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPacing {
    /// Pause before the first welcome message starts typing.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Typing indicator shown before every bot message.
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    /// Time between the start of the welcome message and the start of the name prompt.
    #[serde(default = "default_welcome_gap_ms")]
    pub welcome_gap_ms: u64,
    /// Pause after a visitor answer before the next bot message starts typing.
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_typing_delay_ms() -> u64 {
    800
}

fn default_welcome_gap_ms() -> u64 {
    1000
}

fn default_transition_delay_ms() -> u64 {
    500
}

impl Default for ChatPacing {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            typing_delay_ms: default_typing_delay_ms(),
            welcome_gap_ms: default_welcome_gap_ms(),
            transition_delay_ms: default_transition_delay_ms(),
        }
    }
}

impl ChatPacing {
    /// No delays at all (tests, scripted clients).
    pub fn instant() -> Self {
        Self {
            initial_delay_ms: 0,
            typing_delay_ms: 0,
            welcome_gap_ms: 0,
            transition_delay_ms: 0,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    /// Remaining wait after the welcome message finished typing.
    pub fn welcome_gap_after_typing(&self) -> Duration {
        Duration::from_millis(self.welcome_gap_ms.saturating_sub(self.typing_delay_ms))
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }
}

/// Date layout used in the CSV export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvDateFormat {
    /// 20/01/2024
    #[default]
    #[serde(rename = "dd/mm/yyyy")]
    DayMonthYear,
    /// 01/20/2024
    #[serde(rename = "mm/dd/yyyy")]
    MonthDayYear,
    /// 2024-01-20
    #[serde(rename = "yyyy-mm-dd")]
    Iso,
}

impl CsvDateFormat {
    /// The chrono format string for this layout.
    pub fn pattern(&self) -> &'static str {
        match self {
            CsvDateFormat::DayMonthYear => "%d/%m/%Y",
            CsvDateFormat::MonthDayYear => "%m/%d/%Y",
            CsvDateFormat::Iso => "%Y-%m-%d",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub date_format: CsvDateFormat,
}

/// REST API settings. The bind address can be overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Idle chat sessions are evicted after this many seconds.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl ServerConfig {
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}
