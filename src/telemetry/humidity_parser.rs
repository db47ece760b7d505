// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for humidity-topic payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// Field name used by the default structured format.
pub const DEFAULT_HUMIDITY_FIELD: &str = "humidity";

/// How humidity readings are encoded on the humidity topic.
///
/// The format is fixed per accessory at configuration time; payloads are
/// never auto-detected.
///
/// In TOML the plain format is written `humidityFormat = "plain"` and the
/// structured one `humidityFormat = { json = "humidity" }`.
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::telemetry::HumidityFormat;
///
/// assert_eq!(HumidityFormat::Plain.parse("42.5").unwrap(), 42.5);
///
/// let json = HumidityFormat::json_field("humidity");
/// assert_eq!(json.parse(r#"{"humidity": 61.5, "temperature": 21}"#).unwrap(), 61.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumidityFormat {
    /// The whole payload is a bare number, e.g. `42.5`.
    #[default]
    Plain,
    /// The payload is a JSON object carrying the reading in the named field.
    Json(String),
}

impl HumidityFormat {
    /// Creates a structured format reading the given field.
    #[must_use]
    pub fn json_field(field: impl Into<String>) -> Self {
        Self::Json(field.into())
    }

    /// Parses a payload into a relative humidity percentage.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not a finite number in the
    /// expected encoding, or the JSON field is missing.
    pub fn parse(&self, payload: &str) -> Result<f32, ParseError> {
        let value = match self {
            Self::Plain => parse_number(payload, "humidity")?,
            Self::Json(field) => parse_json_field(payload, field)?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ParseError::InvalidValue {
                field: "humidity".to_string(),
                message: format!("{value} is not a finite number"),
            })
        }
    }
}

fn parse_number(text: &str, field: &str) -> Result<f32, ParseError> {
    text.trim()
        .parse::<f32>()
        .map_err(|e| ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("{text:?}: {e}"),
        })
}

// Readings are percentages, well within f32 precision.
#[allow(clippy::cast_possible_truncation)]
fn parse_json_field(payload: &str, field: &str) -> Result<f32, ParseError> {
    let root: Value = serde_json::from_str(payload)?;

    let value = root
        .get(field)
        .ok_or_else(|| ParseError::MissingField(field.to_string()))?;

    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| ParseError::InvalidValue {
                field: field.to_string(),
                message: format!("{n} is not representable"),
            }),
        // Some bridges publish the reading as a string.
        Value::String(s) => parse_number(s, field),
        other => Err(ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a number, got {other}"),
        }),
    }
}
