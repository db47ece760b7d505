// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the building blocks for updating an accessory's
//! [`DeviceState`](super::DeviceState) and for notifying subscribers.
//!
//! # Change Types
//!
//! - [`StateChange::Power`] - Actuator reported a power state
//! - [`StateChange::ModeState`] - Derived operating mode changed
//! - [`StateChange::Humidity`] - A humidity reading was recorded
//! - [`StateChange::Active`] - Automatic control was enabled or disabled
//! - [`StateChange::Thresholds`] - The hysteresis band was reconfigured
//! - [`StateChange::Batch`] - Multiple changes grouped together
//!
//! # Examples
//!
//! ```
//! use mqtt_humidifier::state::{DeviceState, StateChange};
//! use mqtt_humidifier::types::{CurrentModeState, DeviceKind, PowerState};
//!
//! let mut state = DeviceState::new(DeviceKind::Humidifier);
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::Power(PowerState::On)));
//! assert!(!state.apply(&StateChange::Power(PowerState::On)));
//!
//! assert_eq!(state.mode_state(), CurrentModeState::Humidifying);
//! ```

use crate::types::{CurrentModeState, PowerState, Thresholds};

/// Represents a change in accessory state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// The actuator reported a power state.
    Power(PowerState),

    /// The operating mode derived from power changed.
    ///
    /// This is a notification only; the mode is never stored.
    ModeState(CurrentModeState),

    /// A relative humidity reading was recorded.
    Humidity(f32),

    /// Automatic control was enabled or disabled.
    Active(bool),

    /// The thresholds were replaced.
    Thresholds(Thresholds),

    /// Multiple changes applied together.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Creates the notification pair emitted when the actuator reports power.
    #[must_use]
    pub fn power_report(power: PowerState, mode: CurrentModeState) -> Self {
        Self::Batch(vec![Self::Power(power), Self::ModeState(mode)])
    }
}
