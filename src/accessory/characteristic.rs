// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Characteristic values in the accessory platform's encoding.

use std::fmt;

use crate::types::CurrentModeState;

/// Value of the `Active` characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Active {
    /// Automatic control disabled.
    Inactive = 0,
    /// Automatic control enabled.
    Active = 1,
}

impl Active {
    /// Returns the numeric characteristic value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns `true` for [`Active::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<bool> for Active {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

impl fmt::Display for Active {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Active => write!(f, "ACTIVE"),
        }
    }
}

/// Value of the `CurrentHumidifierDehumidifierState` characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CurrentHumidifierDehumidifierState {
    /// Actuator off.
    Inactive = 0,
    /// Powered but not working. Never reported by this bridge, which
    /// only knows whether the actuator is switched.
    Idle = 1,
    /// Humidifier running.
    Humidifying = 2,
    /// Dehumidifier running.
    Dehumidifying = 3,
}

impl CurrentHumidifierDehumidifierState {
    /// Returns the numeric characteristic value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl From<CurrentModeState> for CurrentHumidifierDehumidifierState {
    fn from(mode: CurrentModeState) -> Self {
        match mode {
            CurrentModeState::Inactive => Self::Inactive,
            CurrentModeState::Humidifying => Self::Humidifying,
            CurrentModeState::Dehumidifying => Self::Dehumidifying,
        }
    }
}

/// Value of the `TargetHumidifierDehumidifierState` characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TargetHumidifierDehumidifierState {
    /// Pick humidifying or dehumidifying automatically.
    #[default]
    Auto = 0,
    /// Humidify only.
    Humidifier = 1,
    /// Dehumidify only.
    Dehumidifier = 2,
}

impl TargetHumidifierDehumidifierState {
    /// Returns the numeric characteristic value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_encoding() {
        assert_eq!(Active::Inactive.value(), 0);
        assert_eq!(Active::Active.value(), 1);
        assert_eq!(Active::from(true), Active::Active);
        assert!(!Active::from(false).is_active());
    }

    #[test]
    fn current_state_encoding() {
        assert_eq!(CurrentHumidifierDehumidifierState::Inactive.value(), 0);
        assert_eq!(CurrentHumidifierDehumidifierState::Idle.value(), 1);
        assert_eq!(CurrentHumidifierDehumidifierState::Humidifying.value(), 2);
        assert_eq!(CurrentHumidifierDehumidifierState::Dehumidifying.value(), 3);
    }

    #[test]
    fn current_state_from_mode() {
        assert_eq!(
            CurrentHumidifierDehumidifierState::from(CurrentModeState::Inactive),
            CurrentHumidifierDehumidifierState::Inactive
        );
        assert_eq!(
            CurrentHumidifierDehumidifierState::from(CurrentModeState::Dehumidifying).value(),
            3
        );
    }

    #[test]
    fn target_state_encoding() {
        assert_eq!(TargetHumidifierDehumidifierState::default().value(), 0);
        assert_eq!(TargetHumidifierDehumidifierState::Humidifier.value(), 1);
        assert_eq!(TargetHumidifierDehumidifierState::Dehumidifier.value(), 2);
    }
}
