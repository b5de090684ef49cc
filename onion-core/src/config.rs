//! Configuration: a small hand-written INI reader plus validation into a
//! strongly-typed [`Config`].
//!
//! No INI-parsing crate is pulled in for this: the subset of INI this crate
//! needs (`[section]` headers, `key = value` pairs, `#`/`;` comments, blank
//! lines) is small enough to parse directly, and a fabricated dependency on
//! a crate nothing else in the workspace uses would be worse than ten lines
//! of splitting. `serde` is still used where it is idiomatically useful: the
//! [`LogLevel`] enum derives it so it composes with the rest of the crate's
//! serializable types.

use crate::command::Command;
use crate::error::{OnionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/onion-ha/oniond.conf";
pub const DEFAULT_LOG_FILE: &str = "/var/log/oniond.log";
pub const DEFAULT_PID_FILE: &str = "/var/run/oniond.pid";

/// Raw `section -> key -> value` map, before validation.
#[derive(Debug, Default, Clone)]
pub struct RawConfig {
    sections: HashMap<String, HashMap<String, String>>,
}

impl RawConfig {
    pub fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current = String::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                current = section.trim().to_string();
                sections.entry(current.clone()).or_default();
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                sections
                    .entry(current.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Self { sections }
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "logging.level must be one of info, warning, error (got {other:?})"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneralConfig {
    pub address: String,
    pub gateway: String,
    pub init_delay: u32,
}

#[derive(Debug, Clone)]
pub struct ClusterSettings {
    pub port: u16,
    pub dead_time: u32,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ActionsConfig {
    pub active: Command,
    pub passive: Command,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub enable: bool,
    pub level: LogLevel,
    pub file: PathBuf,
}

/// The validated, typed configuration consumed by the core engine.
#[derive(Debug, Clone)]
pub struct Config {
    pub general: GeneralConfig,
    pub cluster: ClusterSettings,
    pub actions: ActionsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|err| {
                OnionError::Config(format!(
                    "cannot read config file {}: {err}",
                    path.as_ref().display()
                ))
            })?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self> {
        let raw = RawConfig::parse(text);
        Self::validate(&raw).map_err(|errors| OnionError::Config(errors.join("; ")))
    }

    /// Validate and convert a [`RawConfig`], collecting every problem found
    /// rather than stopping at the first one.
    pub fn validate(raw: &RawConfig) -> std::result::Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let address = required_string(raw, "general", "address", &mut errors);
        let gateway = required_string(raw, "general", "gateway", &mut errors);
        let init_delay = optional_range(raw, "general", "initDelay", 0, 0, 3599, &mut errors);

        let port = required_range(raw, "cluster", "port", 1024, 49150, &mut errors);
        let dead_time = required_range(raw, "cluster", "deadTime", 2, 3599, &mut errors);
        let nodes = required_list(raw, "cluster", "nodes", &mut errors);

        if let (Some(address), Some(nodes)) = (&address, &nodes) {
            if !nodes.contains(address) {
                errors.push(format!(
                    "general.address ({address:?}) must be one of cluster.nodes"
                ));
            }
        }
        if let Some(nodes) = &nodes {
            if nodes.len() < 2 {
                errors.push("cluster.nodes must list at least 2 entries".to_string());
            }
        }

        let active = required_command(raw, "actions", "active", &mut errors);
        let passive = required_command(raw, "actions", "passive", &mut errors);

        let enable = raw
            .get("logging", "enable")
            .map(|v| parse_bool(v, &mut errors, "logging.enable"))
            .unwrap_or(true);
        let level = raw
            .get("logging", "level")
            .map(|v| {
                v.parse::<LogLevel>()
                    .unwrap_or_else(|msg| {
                        errors.push(msg);
                        LogLevel::Info
                    })
            })
            .unwrap_or_default();
        let file = raw
            .get("logging", "file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Config {
            general: GeneralConfig {
                address: address.unwrap(),
                gateway: gateway.unwrap(),
                init_delay,
            },
            cluster: ClusterSettings {
                port: port.unwrap() as u16,
                dead_time: dead_time.unwrap(),
                nodes: nodes.unwrap(),
            },
            actions: ActionsConfig {
                active: active.unwrap(),
                passive: passive.unwrap(),
            },
            logging: LoggingConfig {
                enable,
                level,
                file,
            },
        })
    }
}

fn required_string(raw: &RawConfig, section: &str, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match raw.get(section, key) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.push(format!("{section}.{key} is required"));
            None
        }
    }
}

fn required_range(
    raw: &RawConfig,
    section: &str,
    key: &str,
    min: u32,
    max: u32,
    errors: &mut Vec<String>,
) -> Option<u32> {
    match raw.get(section, key) {
        Some(value) => match value.parse::<u32>() {
            Ok(n) if (min..=max).contains(&n) => Some(n),
            Ok(n) => {
                errors.push(format!(
                    "{section}.{key} must be between {min} and {max} (got {n})"
                ));
                None
            }
            Err(_) => {
                errors.push(format!("{section}.{key} must be an integer (got {value:?})"));
                None
            }
        },
        None => {
            errors.push(format!("{section}.{key} is required"));
            None
        }
    }
}

fn optional_range(
    raw: &RawConfig,
    section: &str,
    key: &str,
    default: u32,
    min: u32,
    max: u32,
    errors: &mut Vec<String>,
) -> u32 {
    match raw.get(section, key) {
        Some(value) => match value.parse::<u32>() {
            Ok(n) if (min..=max).contains(&n) => n,
            Ok(n) => {
                errors.push(format!(
                    "{section}.{key} must be between {min} and {max} (got {n})"
                ));
                default
            }
            Err(_) => {
                errors.push(format!("{section}.{key} must be an integer (got {value:?})"));
                default
            }
        },
        None => default,
    }
}

fn required_list(raw: &RawConfig, section: &str, key: &str, errors: &mut Vec<String>) -> Option<Vec<String>> {
    match raw.get(section, key) {
        Some(value) => Some(
            value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ),
        None => {
            errors.push(format!("{section}.{key} is required"));
            None
        }
    }
}

fn required_command(raw: &RawConfig, section: &str, key: &str, errors: &mut Vec<String>) -> Option<Command> {
    match raw.get(section, key) {
        Some(value) => match Command::parse(value) {
            Ok(cmd) => Some(cmd),
            Err(err) => {
                errors.push(format!("{section}.{key} is not a valid command line: {err}"));
                None
            }
        },
        None => {
            errors.push(format!("{section}.{key} is required"));
            None
        }
    }
}

fn parse_bool(value: &str, errors: &mut Vec<String>, key: &str) -> bool {
    match value {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        other => {
            errors.push(format!("{key} must be a boolean (got {other:?})"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        [general]
        address = 10.0.0.1
        gateway = 10.0.0.254
        initDelay = 0

        [cluster]
        port = 7500
        deadTime = 3
        nodes = 10.0.0.1, 10.0.0.2, 10.0.0.3

        [actions]
        active = /usr/local/bin/onion-active.sh
        passive = /usr/local/bin/onion-passive.sh

        [logging]
        enable = true
        level = info
        file = /var/log/oniond.log
    "#;

    #[test]
    fn parses_a_valid_config() {
        let config = Config::from_str(VALID).unwrap();
        assert_eq!(config.general.address, "10.0.0.1");
        assert_eq!(config.cluster.port, 7500);
        assert_eq!(config.cluster.nodes.len(), 3);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn rejects_address_not_in_nodes() {
        let text = VALID.replace("address = 10.0.0.1", "address = 10.0.0.9");
        let err = Config::from_str(&text).unwrap_err();
        assert!(err.to_string().contains("must be one of cluster.nodes"));
    }

    #[test]
    fn rejects_too_few_nodes() {
        let text = VALID.replace(
            "nodes = 10.0.0.1, 10.0.0.2, 10.0.0.3",
            "nodes = 10.0.0.1",
        );
        let err = Config::from_str(&text).unwrap_err();
        assert!(err.to_string().contains("at least 2 entries"));
    }

    #[test]
    fn rejects_out_of_range_port() {
        let text = VALID.replace("port = 7500", "port = 80");
        let err = Config::from_str(&text).unwrap_err();
        assert!(err.to_string().contains("cluster.port"));
    }

    #[test]
    fn collects_multiple_errors_at_once() {
        let text = VALID
            .replace("port = 7500", "port = 80")
            .replace("deadTime = 3", "deadTime = 1");
        let err = Config::from_str(&text).unwrap_err().to_string();
        assert!(err.contains("cluster.port"));
        assert!(err.contains("cluster.deadTime"));
    }

    #[test]
    fn defaults_logging_level_to_info_when_absent() {
        let text = VALID.replace("level = info\n", "");
        let config = Config::from_str(&text).unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
