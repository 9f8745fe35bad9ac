use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use votecap_api::{
    API_PATH_SUFFIX, DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_VOTERS_TIMEOUT_SECONDS,
    MIN_MESSAGE_INTERVAL_SECONDS,
};
use votecap_messenger::MessageLimit;

pub const CONFIG_FILE_NAME: &str = "votecap.toml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessengerConfig {
    pub node: NodeConfig,
    pub wallet: WalletConfig,
    pub messenger: MessagingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NodeConfig {
    pub api_base_url: String,
    pub sync_check_block_threshold: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_voters_timeout")]
    pub voters_timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct WalletConfig {
    pub address: String,
    pub mnemonic: String,
    pub second_mnemonic: Option<String>,
    pub network_version: u8,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("address", &self.address)
            .field("second_mnemonic", &self.second_mnemonic.as_ref().map(|_| "<redacted>"))
            .field("network_version", &self.network_version)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessagingConfig {
    pub block_producer: String,
    pub vote_cap: u64,
    pub message: String,
    pub interval_secs: u64,
    pub limit_per_voter: i64,
    #[serde(default)]
    pub exclude_voters: Vec<String>,
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub error_log_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: "data.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            error_log_path: "logs/error.log".to_string(),
        }
    }
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

fn default_voters_timeout() -> u64 {
    DEFAULT_VOTERS_TIMEOUT_SECONDS
}

fn default_token_symbol() -> String {
    "SXP".to_string()
}

impl MessengerConfig {
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => {
                let expanded_path = expand_path(path);
                if !expanded_path.exists() {
                    return Err(ConfigError::CustomConfigFileNotFound(
                        expanded_path.display().to_string(),
                    ));
                }
                Self::load_from_path(expanded_path)
            }
            None => {
                let local_path = PathBuf::from(CONFIG_FILE_NAME);
                if local_path.exists() {
                    return Self::load_from_path(local_path);
                }
                Self::load_from_path(get_default_config_path()?)
            }
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::FileReadError)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: MessengerConfig = toml::from_str(contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_url(&self.node.api_base_url)?;

        if self.node.sync_check_block_threshold < 1 {
            return Err(invalid("node.sync_check_block_threshold", "too low"));
        }
        if self.node.request_timeout_secs < 1 || self.node.voters_timeout_secs < 1 {
            return Err(invalid("node timeouts", "must be at least 1 second"));
        }
        if self.messenger.block_producer.trim().is_empty() {
            return Err(invalid("messenger.block_producer", "may not be empty"));
        }
        if self.wallet.address.trim().is_empty() {
            return Err(invalid("wallet.address", "may not be empty"));
        }
        if self.wallet.mnemonic.trim().is_empty() {
            return Err(invalid("wallet.mnemonic", "may not be empty"));
        }
        if self.wallet.second_mnemonic.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(invalid(
                "wallet.second_mnemonic",
                "leave it out instead of setting an empty value",
            ));
        }
        if self.messenger.vote_cap < 1 {
            return Err(invalid("messenger.vote_cap", "too low"));
        }
        if self.messenger.message.is_empty() {
            return Err(invalid("messenger.message", "may not be empty"));
        }
        if self.messenger.interval_secs < MIN_MESSAGE_INTERVAL_SECONDS {
            return Err(invalid(
                "messenger.interval_secs",
                "3600s (1h) is the smallest allowed interval",
            ));
        }
        if MessageLimit::from_config(self.messenger.limit_per_voter).is_none() {
            return Err(invalid("messenger.limit_per_voter", "use -1 to disable limit"));
        }

        Ok(())
    }

    fn validate_url(&self, url: &str) -> Result<(), ConfigError> {
        let valid_schemes = ["http://", "https://"];

        if url.trim().is_empty() {
            return Err(ConfigError::InvalidUrl(
                "node.api_base_url cannot be empty, valid example: \"http://localhost:<port>/api\"".to_string(),
            ));
        }

        if !valid_schemes.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(ConfigError::InvalidUrl(format!(
                "node.api_base_url must start with one of {valid_schemes:?}, found: '{url}'"
            )));
        }

        if url.contains(' ') {
            return Err(ConfigError::InvalidUrl(format!(
                "node.api_base_url cannot contain spaces, found: '{url}'"
            )));
        }

        if !url.ends_with(API_PATH_SUFFIX) {
            return Err(ConfigError::InvalidUrl(format!(
                "node.api_base_url needs to end in '{API_PATH_SUFFIX}', found: '{url}'"
            )));
        }

        Ok(())
    }

    pub fn message_limit(&self) -> MessageLimit {
        MessageLimit::from_config(self.messenger.limit_per_voter).unwrap_or(MessageLimit::Unlimited)
    }

    pub fn data_path(&self) -> PathBuf {
        expand_path(&self.storage.data_path)
    }

    pub fn error_log_path(&self) -> PathBuf {
        expand_path(&self.logging.error_log_path)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue(field.to_string(), reason.to_string())
}

pub fn get_default_config_path() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
    Ok(home_dir.join(".config").join("votecap").join(CONFIG_FILE_NAME))
}

pub fn expand_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path_str = path.as_ref().to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.as_ref())
}

#[derive(Debug)]
pub enum ConfigError {
    ConfigFileNotFound(String),
    CustomConfigFileNotFound(String),
    HomeDirectoryNotFound,
    FileReadError(std::io::Error),
    ParseError(toml::de::Error),
    InvalidUrl(String),
    InvalidValue(String, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigFileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::CustomConfigFileNotFound(path) => write!(f, "Configuration file not found at path: {}", path),
            ConfigError::HomeDirectoryNotFound => write!(f, "Home directory not found"),
            ConfigError::FileReadError(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::ParseError(e) => write!(f, "Failed to parse config file: {}", e),
            ConfigError::InvalidUrl(msg) => write!(f, "Invalid URL configuration: {}", msg),
            ConfigError::InvalidValue(field, reason) => write!(f, "Invalid {}, {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}
