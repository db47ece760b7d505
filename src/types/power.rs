// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of the actuator.

use std::fmt;

/// Represents the power state of the actuator.
///
/// The wire format on both the reported-power topic and the command topic
/// is the literal ASCII `ON` / `OFF`.
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::types::PowerState;
///
/// assert_eq!(PowerState::On.as_str(), "ON");
/// assert_eq!(PowerState::from_payload("ON"), PowerState::On);
/// assert_eq!(PowerState::from_payload("on"), PowerState::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerState {
    /// Power is off.
    #[default]
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Payload sentinel for the on state.
    pub const ON_PAYLOAD: &'static str = "ON";

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => Self::ON_PAYLOAD,
        }
    }

    /// Interprets a reported-power payload.
    ///
    /// Only the exact sentinel `ON` means on; every other payload,
    /// including differently-cased variants, is treated as off.
    #[must_use]
    pub fn from_payload(payload: &str) -> Self {
        if payload == Self::ON_PAYLOAD {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
