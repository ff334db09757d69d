use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::Category;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    pub logging: LoggingConfig,
    pub operators: OperatorConfig,
    pub categories: CategoriesConfig,
}

/// Source database: one shared server holding the raw counter tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Destination server; the database name comes from each category.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// One suffix-code to operator-label entry; the mapping order is
/// significant for resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorMapping {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub mapping: Vec<OperatorMapping>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    pub five_min: CategoryConfig,
    pub fifteen_min: CategoryConfig,
    pub gateway: CategoryConfig,
}

impl CategoriesConfig {
    pub fn get(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::FiveMinute => &self.five_min,
            Category::FifteenMinute => &self.fifteen_min,
            Category::Gateway => &self.gateway,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub enabled: bool,
    /// Destination database holding this category's KPI tables.
    pub database: String,
    /// Path to the table list, one source table name per line.
    pub table_list: String,
    /// Pattern extracting the node label from a table name (first capture).
    pub node_pattern: String,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from config.toml file
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load() -> Result<Self, anyhow::Error> {
        let mut config = if let Some(config_path) = Self::find_config_file() {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SOURCE_HOST / APP_SOURCE_PORT / APP_SOURCE_USER /
    ///   APP_SOURCE_PASSWORD / APP_SOURCE_DB: source database
    /// - APP_DEST_HOST / APP_DEST_PORT / APP_DEST_USER /
    ///   APP_DEST_PASSWORD: destination server
    /// - APP_LOG_LEVEL: logging level (e.g., "info,kpi_transformer=debug")
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SOURCE_HOST") {
            self.source.host = host;
            tracing::info!("Override source.host from env: {}", self.source.host);
        }

        if let Ok(port) = std::env::var("APP_SOURCE_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.source.port = port;
                    tracing::info!("Override source.port from env: {}", self.source.port);
                },
                Err(_) => tracing::warn!(
                    "Invalid APP_SOURCE_PORT '{}' (keep {})",
                    port,
                    self.source.port
                ),
            }
        }

        if let Ok(user) = std::env::var("APP_SOURCE_USER") {
            self.source.user = user;
            tracing::info!("Override source.user from env");
        }

        if let Ok(password) = std::env::var("APP_SOURCE_PASSWORD") {
            self.source.password = password;
            tracing::info!("Override source.password from env");
        }

        if let Ok(database) = std::env::var("APP_SOURCE_DB") {
            self.source.database = database;
            tracing::info!("Override source.database from env: {}", self.source.database);
        }

        if let Ok(host) = std::env::var("APP_DEST_HOST") {
            self.destination.host = host;
            tracing::info!("Override destination.host from env: {}", self.destination.host);
        }

        if let Ok(port) = std::env::var("APP_DEST_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.destination.port = port;
                    tracing::info!("Override destination.port from env: {}", self.destination.port);
                },
                Err(_) => tracing::warn!(
                    "Invalid APP_DEST_PORT '{}' (keep {})",
                    port,
                    self.destination.port
                ),
            }
        }

        if let Ok(user) = std::env::var("APP_DEST_USER") {
            self.destination.user = user;
            tracing::info!("Override destination.user from env");
        }

        if let Ok(password) = std::env::var("APP_DEST_PASSWORD") {
            self.destination.password = password;
            tracing::info!("Override destination.password from env");
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.source.host.is_empty() {
            anyhow::bail!("Source host cannot be empty");
        }
        if self.source.port == 0 {
            anyhow::bail!("Source port cannot be 0");
        }
        if self.destination.host.is_empty() {
            anyhow::bail!("Destination host cannot be empty");
        }
        if self.destination.port == 0 {
            anyhow::bail!("Destination port cannot be 0");
        }

        for mapping in &self.operators.mapping {
            if mapping.code.is_empty() {
                anyhow::bail!("Operator mapping contains an empty suffix code");
            }
        }

        for category in Category::ALL {
            let cfg = self.categories.get(category);
            if !cfg.enabled {
                continue;
            }
            if cfg.database.is_empty() {
                anyhow::bail!("Destination database for {} cannot be empty", category);
            }
            if cfg.table_list.is_empty() {
                anyhow::bail!("Table list path for {} cannot be empty", category);
            }
            regex::Regex::new(&cfg.node_pattern).map_err(|e| {
                anyhow::anyhow!("Invalid node pattern for {}: {}", category, e)
            })?;
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "telemetry_raw".to_string(),
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,kpi_transformer=debug".to_string(),
            file: Some("logs/transformer.log".to_string()),
        }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        let mapping = [
            ("nw", "Inwi"),
            ("mt", "Maroc Telecom"),
            ("ie", "International"),
            ("is", "International"),
            ("bs", "Orange 2G"),
            ("be", "Orange 2G"),
            ("ne", "Orange 3G"),
            ("ns", "Orange 3G"),
        ];
        Self {
            mapping: mapping
                .into_iter()
                .map(|(code, label)| OperatorMapping {
                    code: code.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database: String::new(),
            table_list: String::new(),
            node_pattern: "(?i)^(CALIS|MEIND|RAIND)".to_string(),
        }
    }
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            five_min: CategoryConfig {
                enabled: true,
                database: "kpi_5min".to_string(),
                table_list: "data/tables_5min.txt".to_string(),
                node_pattern: "(?i)^(CALIS|MEIND|RAIND)".to_string(),
            },
            fifteen_min: CategoryConfig {
                enabled: true,
                database: "kpi_15min".to_string(),
                table_list: "data/tables_15min.txt".to_string(),
                node_pattern: "(?i)^(CALIS|MEIND|RAIND)".to_string(),
            },
            gateway: CategoryConfig {
                enabled: true,
                database: "kpi_mgw".to_string(),
                table_list: "data/tables_mgw.txt".to_string(),
                node_pattern: "(?i)^(MGW)".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_node_pattern_rejected() {
        let mut config = Config::default();
        config.categories.five_min.node_pattern = "(unclosed".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_category_is_not_validated() {
        let mut config = Config::default();
        config.categories.gateway.enabled = false;
        config.categories.gateway.database = String::new();
        config.validate().unwrap();
    }

    #[test]
    fn test_operator_mapping_order_preserved() {
        let config = OperatorConfig::default();
        assert_eq!(config.mapping[0].code, "nw");
        assert_eq!(config.mapping[1].code, "mt");
    }

    #[test]
    fn test_from_toml_overlay() {
        let toml = r#"
            [source]
            host = "db.internal"
            port = 3307

            [categories.five_min]
            enabled = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.host, "db.internal");
        assert_eq!(config.source.port, 3307);
        assert!(!config.categories.five_min.enabled);
        // untouched sections keep their defaults
        assert_eq!(config.destination.port, 3306);
        assert!(config.categories.gateway.enabled);
    }
}
