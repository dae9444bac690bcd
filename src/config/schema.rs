use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::identifier::Identifier;

pub const ENV_PREFIX: &str = "SCHEMA_REFRESH";
pub const DEFAULT_LOG_PREFIX: &str = "s0";
const ENV_SEPARATOR: &str = "__";

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct RefreshConfig {
    #[serde(default)]
    pub schema: SchemaConfig,
    // Prepended to every log line of the metadata manager
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            schema: SchemaConfig::default(),
            log_prefix: default_log_prefix(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_log_prefix() -> String {
    DEFAULT_LOG_PREFIX.to_string()
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct SchemaConfig {
    /// When disabled, refresh requests are ignored and the snapshot stays as it is.
    pub enabled: bool,
    /// Keyspaces to keep metadata for, in CQL form; empty means all of them.
    pub refreshed_keyspaces: Vec<String>,
    pub event_channel_capacity: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refreshed_keyspaces: vec![],
            event_channel_capacity: 1024,
        }
    }
}

impl SchemaConfig {
    pub fn refreshed_keyspaces(&self) -> Vec<Identifier> {
        self.refreshed_keyspaces
            .iter()
            .map(|name| Identifier::from_cql(name.trim()))
            .collect()
    }
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    // Default filter directive, overridden by RUST_LOG
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

pub fn validate_config(config: RefreshConfig) -> Result<RefreshConfig, ConfigError> {
    if config.schema.event_channel_capacity == 0 {
        return Err(ConfigError::Message(
            "schema.event_channel_capacity must be greater than 0".to_string(),
        ));
    }

    if let Some(name) = config
        .schema
        .refreshed_keyspaces
        .iter()
        .find(|name| name.trim().is_empty() || name.trim() == "\"\"")
    {
        return Err(ConfigError::Message(format!(
            "Invalid keyspace name {name:?} in schema.refreshed_keyspaces"
        )));
    }

    Ok(config)
}

fn with_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("schema.refreshed_keyspaces")
            .try_parsing(true),
    )
}

pub fn load_config(path: &Path) -> Result<RefreshConfig, ConfigError> {
    let config = with_environment(Config::builder().add_source(File::from(path)));

    config.build()?.try_deserialize().and_then(validate_config)
}

/// Configuration when no file is given: defaults plus environment overrides.
pub fn load_default_config() -> Result<RefreshConfig, ConfigError> {
    load_config_from_string("", false)
}

// Load a config from a string (to test our structs are defined correctly)
pub fn load_config_from_string(
    config_str: &str,
    skip_validation: bool,
) -> Result<RefreshConfig, ConfigError> {
    let config = with_environment(
        Config::builder().add_source(File::from_str(config_str, FileFormat::Toml)),
    );

    if skip_validation {
        config.build()?.try_deserialize()
    } else {
        config.build()?.try_deserialize().and_then(validate_config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{
        load_config, load_config_from_string, LoggingConfig, RefreshConfig, SchemaConfig,
    };
    use crate::identifier::Identifier;

    const TEST_CONFIG_BASIC: &str = r#"
log_prefix = "cluster1"

[schema]
enabled = false
refreshed_keyspaces = ["ks1", "\"MixedCase\""]
event_channel_capacity = 16

[logging]
level = "debug"
json = true
"#;

    const TEST_CONFIG_ERROR: &str = r#"
[schema]
enabled = "maybe""#;

    // Invalid config: listeners could never receive anything
    const TEST_CONFIG_INVALID: &str = r#"
[schema]
event_channel_capacity = 0"#;

    const TEST_CONFIG_EMPTY_KEYSPACE: &str = r#"
[schema]
refreshed_keyspaces = ["ks1", " "]"#;

    #[test]
    fn test_parse_config_basic() {
        let config = load_config_from_string(TEST_CONFIG_BASIC, false).unwrap();

        assert_eq!(
            config,
            RefreshConfig {
                schema: SchemaConfig {
                    enabled: false,
                    refreshed_keyspaces: vec!["ks1".to_string(), "\"MixedCase\"".to_string()],
                    event_channel_capacity: 16,
                },
                log_prefix: "cluster1".to_string(),
                logging: LoggingConfig {
                    level: "debug".to_string(),
                    json: true,
                },
            }
        );
        assert_eq!(
            config.schema.refreshed_keyspaces(),
            vec![
                Identifier::from_internal("ks1"),
                Identifier::from_internal("MixedCase")
            ]
        );
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = load_config_from_string("", false).unwrap();
        assert_eq!(config, RefreshConfig::default());
        assert!(config.schema.enabled);
        assert_eq!(config.schema.event_channel_capacity, 1024);
    }

    #[test]
    fn test_parse_config_erroneous() {
        let error = load_config_from_string(TEST_CONFIG_ERROR, false).unwrap_err();
        assert!(error.to_string().contains("maybe"))
    }

    #[test]
    fn test_parse_config_invalid() {
        let error = load_config_from_string(TEST_CONFIG_INVALID, false).unwrap_err();
        assert!(error
            .to_string()
            .contains("schema.event_channel_capacity must be greater than 0"));

        let config = load_config_from_string(TEST_CONFIG_INVALID, true).unwrap();
        assert_eq!(config.schema.event_channel_capacity, 0);
    }

    #[test]
    fn test_parse_config_empty_keyspace_name() {
        let error = load_config_from_string(TEST_CONFIG_EMPTY_KEYSPACE, false).unwrap_err();
        assert!(error.to_string().contains("Invalid keyspace name \" \""));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TEST_CONFIG_BASIC.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.log_prefix, "cluster1");
        assert_eq!(config.logging.level, "debug");
    }
}
