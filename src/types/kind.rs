// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device kind and the operating mode derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::PowerState;

/// Which way the actuator moves the humidity.
///
/// The kind is fixed per accessory and selects the sense of the threshold
/// comparison and the working state reported while powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Adds moisture; runs while the air is too dry.
    #[default]
    Humidifier,
    /// Removes moisture; runs while the air is too humid.
    Dehumidifier,
}

impl DeviceKind {
    /// Returns the mode reported while the actuator is powered.
    #[must_use]
    pub const fn working_state(&self) -> CurrentModeState {
        match self {
            Self::Humidifier => CurrentModeState::Humidifying,
            Self::Dehumidifier => CurrentModeState::Dehumidifying,
        }
    }

    /// Derives the current mode from a confirmed power state.
    #[must_use]
    pub const fn mode_state(&self, power: PowerState) -> CurrentModeState {
        match power {
            PowerState::On => self.working_state(),
            PowerState::Off => CurrentModeState::Inactive,
        }
    }

    /// Returns the default accessory name for this kind.
    #[must_use]
    pub const fn default_name(&self) -> &'static str {
        match self {
            Self::Humidifier => "Humidifier",
            Self::Dehumidifier => "Dehumidifier",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Humidifier => write!(f, "humidifier"),
            Self::Dehumidifier => write!(f, "dehumidifier"),
        }
    }
}

/// Operating mode of the accessory as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrentModeState {
    /// The actuator is off.
    Inactive,
    /// A humidifier is running.
    Humidifying,
    /// A dehumidifier is running.
    Dehumidifying,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_state_is_inactive_when_off() {
        assert_eq!(
            DeviceKind::Humidifier.mode_state(PowerState::Off),
            CurrentModeState::Inactive
        );
        assert_eq!(
            DeviceKind::Dehumidifier.mode_state(PowerState::Off),
            CurrentModeState::Inactive
        );
    }

    #[test]
    fn mode_state_is_working_state_when_on() {
        assert_eq!(
            DeviceKind::Humidifier.mode_state(PowerState::On),
            CurrentModeState::Humidifying
        );
        assert_eq!(
            DeviceKind::Dehumidifier.mode_state(PowerState::On),
            CurrentModeState::Dehumidifying
        );
    }

    #[test]
    fn kind_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: DeviceKind,
        }

        let w: Wrapper = toml::from_str(r#"kind = "dehumidifier""#).unwrap();
        assert_eq!(w.kind, DeviceKind::Dehumidifier);
    }

    #[test]
    fn default_names() {
        assert_eq!(DeviceKind::Humidifier.default_name(), "Humidifier");
        assert_eq!(DeviceKind::Dehumidifier.default_name(), "Dehumidifier");
    }
}
