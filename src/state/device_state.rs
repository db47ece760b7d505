// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory state tracking.

use crate::types::{CurrentModeState, DeviceKind, PowerState, Thresholds};

use super::StateChange;

/// In-memory state of one accessory.
///
/// `power` is the last state *reported* by the actuator, never the state
/// most recently requested. The operating mode is derived from it on read.
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::state::DeviceState;
/// use mqtt_humidifier::types::{CurrentModeState, DeviceKind, PowerState};
///
/// let state = DeviceState::new(DeviceKind::Dehumidifier);
/// assert!(state.is_active());
/// assert_eq!(state.power(), PowerState::Off);
/// assert_eq!(state.humidity(), None);
/// assert_eq!(state.mode_state(), CurrentModeState::Inactive);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    /// Fixed device kind.
    kind: DeviceKind,
    /// Confirmed actuator power.
    power: PowerState,
    /// Whether automatic control is enabled.
    active: bool,
    /// Last recorded relative humidity.
    humidity: Option<f32>,
    /// Hysteresis band.
    thresholds: Thresholds,
}

impl DeviceState {
    /// Creates the startup state with default thresholds.
    #[must_use]
    pub fn new(kind: DeviceKind) -> Self {
        Self::with_thresholds(kind, Thresholds::default())
    }

    /// Creates the startup state with the given thresholds.
    #[must_use]
    pub fn with_thresholds(kind: DeviceKind, thresholds: Thresholds) -> Self {
        Self {
            kind,
            power: PowerState::Off,
            active: true,
            humidity: None,
            thresholds,
        }
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the confirmed power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Returns the operating mode derived from confirmed power.
    #[must_use]
    pub fn mode_state(&self) -> CurrentModeState {
        self.kind.mode_state(self.power)
    }

    /// Returns whether automatic control is enabled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the last recorded humidity, if any.
    #[must_use]
    pub fn humidity(&self) -> Option<f32> {
        self.humidity
    }

    /// Returns the current thresholds.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Applies a state change to this state.
    ///
    /// Returns `true` if the state was modified, `false` if it was already
    /// at the target value. [`StateChange::ModeState`] never modifies state
    /// because the mode is derived from power.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Power(power) => replace(&mut self.power, *power),
            StateChange::ModeState(_) => false,
            StateChange::Humidity(value) => {
                // Compare bitwise so repeated identical readings report no change.
                if self.humidity.map(f32::to_bits) == Some(value.to_bits()) {
                    false
                } else {
                    self.humidity = Some(*value);
                    true
                }
            }
            StateChange::Active(active) => replace(&mut self.active, *active),
            StateChange::Thresholds(thresholds) => replace(&mut self.thresholds, *thresholds),
            StateChange::Batch(changes) => {
                let mut any_changed = false;
                for c in changes {
                    if self.apply(c) {
                        any_changed = true;
                    }
                }
                any_changed
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
