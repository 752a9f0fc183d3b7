//! Configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. YAML file (`--config`, or `<config dir>/sri/config.yaml` when present)
//! 3. `settings.env` dotenv file in the working directory
//! 4. process environment: `MQTT_BROKER`, `MQTT_PORT`, `MQTT_CLIENT_ID`

use crate::convert::{ResourceType, RowPolicy, SemanticConverter};
use crate::route::{RoutingTable, BUILDING_TOPIC, DEFAULT_BASE, PV_TOPIC};
use crate::transport::MqttSettings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DOTENV_FILE: &str = "settings.env";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to load settings.env: {0}")]
    Env(#[from] dotenv::Error),

    #[error("invalid MQTT_PORT '{0}'")]
    InvalidPort(String),

    #[error("MQTT broker is not configured (set MQTT_BROKER or mqtt.broker)")]
    MissingBroker,
}

/// Topic routing section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Base of the generic `{base}/{type}` topics
    pub base: String,
    /// Fixed topics per resource type
    pub topics: BTreeMap<ResourceType, String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let mut topics = BTreeMap::new();
        topics.insert(ResourceType::Pv, PV_TOPIC.to_string());
        topics.insert(ResourceType::Building, BUILDING_TOPIC.to_string());
        Self {
            base: DEFAULT_BASE.to_string(),
            topics,
        }
    }
}

impl RoutingConfig {
    pub fn table(&self) -> RoutingTable {
        self.topics
            .iter()
            .fold(RoutingTable::with_base(self.base.as_str()), |table, (t, topic)| {
                table.with_topic(*t, topic.as_str())
            })
    }
}

/// Conversion section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub row_policy: RowPolicy,
}

impl ConversionConfig {
    pub fn converter(&self) -> SemanticConverter {
        SemanticConverter::new().with_policy(self.row_policy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mqtt: MqttSettings,
    pub routing: RoutingConfig,
    pub conversion: ConversionConfig,
}

/// Default config file location (`~/.config/sri/config.yaml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sri").join("config.yaml"))
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Load from every source. An explicit `path` must exist; the default
    /// location is used only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(
            path,
            default_config_path(),
            Path::new(DOTENV_FILE),
            |key| std::env::var(key).ok(),
        )
    }

    /// `load` with every location and the process environment supplied by
    /// the caller. Process variables win over those in `env_file`.
    pub fn load_from<F>(
        path: Option<&Path>,
        default_path: Option<PathBuf>,
        env_file: &Path,
        process_env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_path.filter(|p| p.is_file()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };

        let file_vars = read_env_file(env_file)?;
        config.apply_env(|key| process_env(key).or_else(|| file_vars.get(key).cloned()))?;
        Ok(config)
    }

    /// Apply `MQTT_*` overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(broker) = lookup("MQTT_BROKER") {
            self.mqtt.broker = broker;
        }
        if let Some(port) = lookup("MQTT_PORT") {
            self.mqtt.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(client_id) = lookup("MQTT_CLIENT_ID") {
            self.mqtt.client_id = client_id;
        }
        Ok(())
    }

    /// Check the settings needed to publish to a broker.
    pub fn require_broker(&self) -> Result<&MqttSettings, ConfigError> {
        if self.mqtt.broker.trim().is_empty() {
            return Err(ConfigError::MissingBroker);
        }
        Ok(&self.mqtt)
    }
}

/// Variables from a dotenv file; empty when the file does not exist.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let mut vars = HashMap::new();
    for item in dotenv::from_path_iter(path)? {
        let (key, value) = item?;
        vars.insert(key, value);
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_standard_routing() {
        let config = Config::default();
        assert_eq!(config.mqtt.port, 1883);
        assert!(config.mqtt.client_id.starts_with("sri-"));
        assert_eq!(config.routing.table(), RoutingTable::new());
        assert_eq!(config.conversion.row_policy, RowPolicy::Isolate);
    }

    #[test]
    fn yaml_overrides_sections() {
        let config = Config::from_yaml(
            "mqtt:\n  broker: broker.local\n  port: 8883\n  client_id: site-gw\n\
             routing:\n  base: lab/sri\n  topics:\n    ev: lab/partner3/ev\n\
             conversion:\n  row_policy: abort\n",
        )
        .unwrap();

        assert_eq!(config.mqtt.broker, "broker.local");
        assert_eq!(config.mqtt.port, 8883);
        assert_eq!(config.mqtt.client_id, "site-gw");
        let table = config.routing.table();
        assert_eq!(table.topic_for(ResourceType::Ev), "lab/partner3/ev");
        assert_eq!(table.topic_for(ResourceType::Hvac), "lab/sri/hvac");
        // Listing topics replaces the defaults
        assert_eq!(table.topic_for(ResourceType::Pv), "lab/sri/pv");
        assert_eq!(config.conversion.converter().policy(), RowPolicy::Abort);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::from_yaml("mqtt:\n  broker: file-broker\n").unwrap();
        config
            .apply_env(env(&[("MQTT_BROKER", "env-broker"), ("MQTT_PORT", "1884")]))
            .unwrap();
        assert_eq!(config.mqtt.broker, "env-broker");
        assert_eq!(config.mqtt.port, 1884);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("MQTT_PORT", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(p) if p == "abc"));
    }

    #[test]
    fn publishing_requires_a_broker() {
        let config = Config::default();
        assert!(matches!(config.require_broker(), Err(ConfigError::MissingBroker)));
    }

    #[test]
    fn load_reads_default_file_and_settings_env() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join("config.yaml");
        std::fs::write(&default_path, "mqtt:\n  broker: yaml-broker\n  client_id: yaml-id\n")
            .unwrap();
        let env_file = dir.path().join(DOTENV_FILE);
        std::fs::write(&env_file, "MQTT_BROKER=file-broker\nMQTT_PORT=1999\n").unwrap();

        let config = Config::load_from(
            None,
            Some(default_path),
            &env_file,
            env(&[("MQTT_PORT", "2000")]),
        )
        .unwrap();

        assert_eq!(config.mqtt.broker, "file-broker");
        assert_eq!(config.mqtt.port, 2000);
        assert_eq!(config.mqtt.client_id, "yaml-id");
    }

    #[test]
    fn load_without_any_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(
            None,
            Some(dir.path().join("missing.yaml")),
            &dir.path().join(DOTENV_FILE),
            env(&[]),
        )
        .unwrap();
        assert_eq!(config.routing, RoutingConfig::default());
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn malformed_settings_env_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(DOTENV_FILE);
        std::fs::write(&env_file, "this is not a variable\n").unwrap();
        let err = Config::load_from(None, None, &env_file, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
