// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration loaded from TOML.
//!
//! ```toml
//! [logging]
//! filter = "mqtt_humidifier=debug"
//!
//! [[accessory]]
//! kind = "humidifier"
//! mqttUrl = "mqtt://192.168.1.50"
//!
//! [[accessory]]
//! kind = "dehumidifier"
//! mqttUrl = "mqtt://192.168.1.50"
//! powerTopic = "sonoff/dehumidifier/value/POWER"
//! powerCommandTopic = "sonoff/dehumidifier/value/cmnd/POWER"
//! humidityTopic = "tele/bathroom/SENSOR"
//! humidityFormat = { json = "humidity" }
//! ```
//!
//! Accessory keys are camelCase. Defaults that depend on the device kind
//! (refresh topic, humidity format, read behavior) are resolved after the
//! kind is known. `MQTT_HUMIDIFIER_URL` supplies the broker URL for every
//! accessory that does not set `mqttUrl`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ValueError};
use crate::telemetry::{DEFAULT_HUMIDITY_FIELD, HumidityFormat};
use crate::types::{DeviceKind, Thresholds};

/// Environment variable supplying a default broker URL.
pub const URL_ENV: &str = "MQTT_HUMIDIFIER_URL";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "mqtt-humidifier.toml";

const DEFAULT_POWER_TOPIC: &str = "sonoff/humidifier/value/POWER";
const DEFAULT_POWER_COMMAND_TOPIC: &str = "sonoff/humidifier/value/cmnd/POWER";
const DEFAULT_HUMIDITY_TOPIC: &str = "home/humidity/value";
const DEFAULT_REFRESH_TOPIC: &str = "home/humidity/get";
const DEFAULT_REFRESH_MINUTES: u64 = 15;
/// One week.
const MAX_REFRESH_MINUTES: u64 = 7 * 24 * 60;
const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// One entry per `[[accessory]]` table.
    #[serde(rename = "accessory")]
    pub accessories: Vec<AccessoryConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mqtt_humidifier=info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Loads configuration from a TOML file, applies environment overrides
    /// and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or the
    /// configuration is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            self.apply_default_url(&url);
        }
    }

    /// Sets the broker URL of every accessory that has none.
    pub fn apply_default_url(&mut self, url: &str) {
        for accessory in &mut self.accessories {
            if accessory.mqtt_url.is_none() {
                accessory.mqtt_url = Some(url.to_string());
            }
        }
    }

    /// Checks that the configuration can be run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accessories.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[accessory]] is required".to_string(),
            ));
        }

        for (i, accessory) in self.accessories.iter().enumerate() {
            accessory.validate()?;
            if self.accessories[..i].iter().any(|a| a.name == accessory.name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate accessory name {:?}",
                    accessory.name
                )));
            }
        }
        Ok(())
    }
}

/// Configuration of one accessory.
///
/// Deserialized from an `[[accessory]]` table; see the module docs for the
/// key names. Use [`AccessoryConfig::humidifier`] or
/// [`AccessoryConfig::dehumidifier`] to build one in code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAccessoryConfig")]
pub struct AccessoryConfig {
    /// Device kind.
    pub kind: DeviceKind,
    /// Display name, also used in logs.
    pub name: String,
    /// Broker URL (`mqtt://[user:pass@]host[:port]`).
    pub mqtt_url: Option<String>,
    /// Broker user name.
    pub mqtt_username: Option<String>,
    /// Broker password.
    pub mqtt_password: Option<String>,
    /// Explicit MQTT client id.
    pub mqtt_client_id: Option<String>,
    /// Topic on which the actuator reports its power state.
    pub power_topic: String,
    /// Topic on which power commands are published.
    pub power_command_topic: String,
    /// Topic carrying humidity readings.
    pub humidity_topic: String,
    /// Topic on which refresh requests are published, if any.
    pub refresh_humidity_topic: Option<String>,
    /// Minutes between scheduled refresh requests.
    pub refresh_humidity_minutes_interval: u64,
    /// Encoding of humidity readings.
    pub humidity_format: HumidityFormat,
    /// Humidifier threshold in percent.
    pub humidifier_threshold: f32,
    /// Dehumidifier threshold in percent.
    pub dehumidifier_threshold: f32,
    /// Whether a humidity read waits for its refresh request to be delivered.
    pub await_refresh_on_read: bool,
    /// Whether an ON command is published at startup.
    pub power_on_startup: bool,
    /// Seconds an awaited publish may take before it is reported failed.
    pub delivery_timeout_seconds: u64,
}

impl AccessoryConfig {
    /// Creates a configuration with the defaults for `kind`.
    #[must_use]
    pub fn new(kind: DeviceKind, mqtt_url: impl Into<String>) -> Self {
        Self::from(RawAccessoryConfig {
            kind,
            mqtt_url: Some(mqtt_url.into()),
            ..RawAccessoryConfig::default()
        })
    }

    /// Creates a humidifier configuration with default topics.
    #[must_use]
    pub fn humidifier(mqtt_url: impl Into<String>) -> Self {
        Self::new(DeviceKind::Humidifier, mqtt_url)
    }

    /// Creates a dehumidifier configuration with default topics.
    #[must_use]
    pub fn dehumidifier(mqtt_url: impl Into<String>) -> Self {
        Self::new(DeviceKind::Dehumidifier, mqtt_url)
    }

    /// Returns the configured thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the pair is out of range or inverted.
    pub fn thresholds(&self) -> Result<Thresholds, ValueError> {
        Thresholds::new(self.humidifier_threshold, self.dehumidifier_threshold)
    }

    /// Returns the interval between scheduled refresh requests.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_humidity_minutes_interval.saturating_mul(60))
    }

    /// Returns how long awaited publishes may take.
    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_seconds)
    }

    /// Checks that this accessory can be run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| {
            Err(ConfigError::Validation(format!(
                "accessory {:?}: {message}",
                self.name
            )))
        };

        if self.mqtt_url.as_deref().is_none_or(str::is_empty) {
            return invalid(format!("mqttUrl is required (or set {URL_ENV})"));
        }
        if self.name.is_empty() {
            return invalid("name must not be empty".to_string());
        }
        for (key, topic) in [
            ("powerTopic", &self.power_topic),
            ("powerCommandTopic", &self.power_command_topic),
            ("humidityTopic", &self.humidity_topic),
        ] {
            if topic.is_empty() {
                return invalid(format!("{key} must not be empty"));
            }
        }
        if self.power_topic == self.humidity_topic {
            return invalid("powerTopic and humidityTopic must differ".to_string());
        }
        if !(1..=MAX_REFRESH_MINUTES).contains(&self.refresh_humidity_minutes_interval) {
            return invalid(format!(
                "refreshHumidityMinutesInterval must be between 1 and {MAX_REFRESH_MINUTES}"
            ));
        }
        if self.delivery_timeout_seconds == 0 {
            return invalid("deliveryTimeoutSeconds must be at least 1".to_string());
        }
        if let Err(e) = self.thresholds() {
            return invalid(e.to_string());
        }
        Ok(())
    }
}

/// Accessory table as written in the file, before kind defaults apply.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAccessoryConfig {
    kind: DeviceKind,
    name: Option<String>,
    mqtt_url: Option<String>,
    mqtt_username: Option<String>,
    mqtt_password: Option<String>,
    mqtt_client_id: Option<String>,
    power_topic: Option<String>,
    power_command_topic: Option<String>,
    humidity_topic: Option<String>,
    refresh_humidity_topic: Option<String>,
    refresh_humidity_minutes_interval: Option<u64>,
    humidity_format: Option<HumidityFormat>,
    humidifier_threshold: Option<f32>,
    dehumidifier_threshold: Option<f32>,
    await_refresh_on_read: Option<bool>,
    power_on_startup: bool,
    delivery_timeout_seconds: Option<u64>,
}

impl From<RawAccessoryConfig> for AccessoryConfig {
    fn from(raw: RawAccessoryConfig) -> Self {
        let kind = raw.kind;
        let is_humidifier = kind == DeviceKind::Humidifier;

        let refresh_humidity_topic = match raw.refresh_humidity_topic {
            // An empty string disables refresh requests explicitly.
            Some(topic) if topic.is_empty() => None,
            Some(topic) => Some(topic),
            None if is_humidifier => Some(DEFAULT_REFRESH_TOPIC.to_string()),
            None => None,
        };

        let humidity_format = raw.humidity_format.unwrap_or_else(|| {
            if is_humidifier {
                HumidityFormat::Plain
            } else {
                HumidityFormat::json_field(DEFAULT_HUMIDITY_FIELD)
            }
        });

        Self {
            kind,
            name: raw.name.unwrap_or_else(|| kind.default_name().to_string()),
            mqtt_url: raw.mqtt_url,
            mqtt_username: raw.mqtt_username,
            mqtt_password: raw.mqtt_password,
            mqtt_client_id: raw.mqtt_client_id,
            power_topic: raw
                .power_topic
                .unwrap_or_else(|| DEFAULT_POWER_TOPIC.to_string()),
            power_command_topic: raw
                .power_command_topic
                .unwrap_or_else(|| DEFAULT_POWER_COMMAND_TOPIC.to_string()),
            humidity_topic: raw
                .humidity_topic
                .unwrap_or_else(|| DEFAULT_HUMIDITY_TOPIC.to_string()),
            refresh_humidity_topic,
            refresh_humidity_minutes_interval: raw
                .refresh_humidity_minutes_interval
                .unwrap_or(DEFAULT_REFRESH_MINUTES),
            humidity_format,
            humidifier_threshold: raw
                .humidifier_threshold
                .unwrap_or(Thresholds::DEFAULT_HUMIDIFIER),
            dehumidifier_threshold: raw
                .dehumidifier_threshold
                .unwrap_or(Thresholds::DEFAULT_DEHUMIDIFIER),
            await_refresh_on_read: raw.await_refresh_on_read.unwrap_or(is_humidifier),
            power_on_startup: raw.power_on_startup,
            delivery_timeout_seconds: raw
                .delivery_timeout_seconds
                .unwrap_or(DEFAULT_DELIVERY_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humidifier_defaults() {
        let config = AccessoryConfig::humidifier("mqtt://localhost");
        assert_eq!(config.kind, DeviceKind::Humidifier);
        assert_eq!(config.name, "Humidifier");
        assert_eq!(config.power_topic, "sonoff/humidifier/value/POWER");
        assert_eq!(
            config.power_command_topic,
            "sonoff/humidifier/value/cmnd/POWER"
        );
        assert_eq!(config.humidity_topic, "home/humidity/value");
        assert_eq!(
            config.refresh_humidity_topic.as_deref(),
            Some("home/humidity/get")
        );
        assert_eq!(config.refresh_interval(), Duration::from_secs(15 * 60));
        assert_eq!(config.humidity_format, HumidityFormat::Plain);
        assert_eq!(config.thresholds().unwrap(), Thresholds::default());
        assert!(config.await_refresh_on_read);
        assert!(!config.power_on_startup);
        assert_eq!(config.delivery_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dehumidifier_defaults() {
        let config = AccessoryConfig::dehumidifier("mqtt://localhost");
        assert_eq!(config.name, "Dehumidifier");
        assert_eq!(config.refresh_humidity_topic, None);
        assert_eq!(
            config.humidity_format,
            HumidityFormat::json_field("humidity")
        );
        assert!(!config.await_refresh_on_read);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_file() {
        let toml = r#"
            [logging]
            filter = "debug"

            [[accessory]]
            kind = "humidifier"
            name = "Bedroom"
            mqttUrl = "mqtt://10.0.0.2:1884"
            mqttUsername = "bridge"
            mqttPassword = "secret"
            humidifierThreshold = 40
            dehumidifierThreshold = 55.5
            refreshHumidityMinutesInterval = 5
            awaitRefreshOnRead = false
            powerOnStartup = true

            [[accessory]]
            kind = "dehumidifier"
            name = "Cellar"
            powerTopic = "sonoff/cellar/value/POWER"
            refreshHumidityTopic = "cellar/humidity/get"
            humidityFormat = { json = "Humidity" }
        "#;
        let config = BridgeConfig::parse(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.accessories.len(), 2);

        let bedroom = &config.accessories[0];
        assert_eq!(bedroom.name, "Bedroom");
        assert_eq!(bedroom.mqtt_username.as_deref(), Some("bridge"));
        assert_eq!(bedroom.mqtt_password.as_deref(), Some("secret"));
        assert_eq!(
            bedroom.thresholds().unwrap(),
            Thresholds::new(40.0, 55.5).unwrap()
        );
        assert_eq!(bedroom.refresh_interval(), Duration::from_secs(300));
        assert!(!bedroom.await_refresh_on_read);
        assert!(bedroom.power_on_startup);

        let cellar = &config.accessories[1];
        assert_eq!(cellar.kind, DeviceKind::Dehumidifier);
        assert_eq!(cellar.power_topic, "sonoff/cellar/value/POWER");
        assert_eq!(
            cellar.refresh_humidity_topic.as_deref(),
            Some("cellar/humidity/get")
        );
        assert_eq!(cellar.humidity_format, HumidityFormat::json_field("Humidity"));
        assert_eq!(cellar.mqtt_url, None);
    }

    #[test]
    fn empty_refresh_topic_disables_refresh() {
        let toml = r#"
            [[accessory]]
            mqttUrl = "mqtt://localhost"
            refreshHumidityTopic = ""
        "#;
        let config = BridgeConfig::parse(toml).unwrap();
        assert_eq!(config.accessories[0].refresh_humidity_topic, None);
    }

    #[test]
    fn kind_defaults_to_humidifier() {
        let config = BridgeConfig::parse("[[accessory]]\nmqttUrl = 'mqtt://x'").unwrap();
        assert_eq!(config.accessories[0].kind, DeviceKind::Humidifier);
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let result = BridgeConfig::parse("[[accessory]]\nkind = 'heater'");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn default_url_only_fills_missing() {
        let toml = r#"
            [[accessory]]
            name = "A"

            [[accessory]]
            name = "B"
            mqttUrl = "mqtt://explicit"
        "#;
        let mut config = BridgeConfig::parse(toml).unwrap();
        assert!(config.validate().is_err());

        config.apply_default_url("mqtt://from-env");
        assert_eq!(
            config.accessories[0].mqtt_url.as_deref(),
            Some("mqtt://from-env")
        );
        assert_eq!(
            config.accessories[1].mqtt_url.as_deref(),
            Some("mqtt://explicit")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_requires_accessories() {
        let err = BridgeConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let mut config = AccessoryConfig::humidifier("mqtt://localhost");
        config.humidifier_threshold = 60.0;
        config.dehumidifier_threshold = 60.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must be below"));
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = AccessoryConfig::dehumidifier("mqtt://localhost");
        config.dehumidifier_threshold = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = AccessoryConfig::humidifier("mqtt://localhost");
        config.refresh_humidity_minutes_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_interval() {
        let mut config = AccessoryConfig::humidifier("mqtt://localhost");
        config.refresh_humidity_minutes_interval = MAX_REFRESH_MINUTES;
        assert!(config.validate().is_ok());

        config.refresh_humidity_minutes_interval = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_or_clashing_topics() {
        let mut config = AccessoryConfig::humidifier("mqtt://localhost");
        config.power_command_topic = String::new();
        assert!(config.validate().is_err());

        let mut config = AccessoryConfig::humidifier("mqtt://localhost");
        config.humidity_topic.clone_from(&config.power_topic);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let config = BridgeConfig {
            logging: LoggingConfig::default(),
            accessories: vec![
                AccessoryConfig::humidifier("mqtt://a"),
                AccessoryConfig::humidifier("mqtt://b"),
            ],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = BridgeConfig::load("/nonexistent/mqtt-humidifier.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        assert!(matches!(
            BridgeConfig::parse("invalid {{{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
