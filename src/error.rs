// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! The hierarchy mirrors the layers of the crate: value validation, MQTT
//! transport, payload parsing, and configuration loading.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A value was rejected by validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The transport failed to subscribe, publish, or deliver.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An inbound payload could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A message arrived on a topic the accessory does not handle.
    #[error("unknown topic: {topic}")]
    UnknownTopic {
        /// The topic the message arrived on.
        topic: String,
    },
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A relative humidity value is outside `0..=100`.
    #[error("humidity {0} is out of range [0, 100]")]
    HumidityOutOfRange(f32),

    /// The humidifier threshold is not strictly below the dehumidifier threshold.
    #[error(
        "humidifier threshold {humidifier} must be below dehumidifier threshold {dehumidifier}"
    )]
    InvertedThresholds {
        /// Requested humidifier threshold.
        humidifier: f32,
        /// Requested dehumidifier threshold.
        dehumidifier: f32,
    },
}

/// Errors related to MQTT communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected a request.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// A published message was never acknowledged by the broker.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Errors related to parsing inbound payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to loading the bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration is well-formed but not usable.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
