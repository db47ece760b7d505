// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Threshold hysteresis policy.

use crate::types::{DeviceKind, PowerState, Thresholds};

/// Returns the power state the actuator should be in for a reading.
///
/// Comparisons are strict. A reading inside the band, or exactly on a
/// threshold, keeps `current`.
///
/// | kind | ON when | OFF when |
/// |---|---|---|
/// | humidifier | `h < humidifier` | `h > dehumidifier` |
/// | dehumidifier | `h > dehumidifier` | `h < humidifier` |
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::control::candidate_power;
/// use mqtt_humidifier::types::{DeviceKind, PowerState, Thresholds};
///
/// let t = Thresholds::default(); // 45 / 60
/// assert_eq!(
///     candidate_power(DeviceKind::Humidifier, 40.0, t, PowerState::Off),
///     PowerState::On
/// );
/// assert_eq!(
///     candidate_power(DeviceKind::Dehumidifier, 50.0, t, PowerState::On),
///     PowerState::On
/// );
/// ```
#[must_use]
pub fn candidate_power(
    kind: DeviceKind,
    humidity: f32,
    thresholds: Thresholds,
    current: PowerState,
) -> PowerState {
    let too_dry = humidity < thresholds.humidifier();
    let too_humid = humidity > thresholds.dehumidifier();

    let (turn_on, turn_off) = match kind {
        DeviceKind::Humidifier => (too_dry, too_humid),
        DeviceKind::Dehumidifier => (too_humid, too_dry),
    };

    if turn_on {
        PowerState::On
    } else if turn_off {
        PowerState::Off
    } else {
        current
    }
}
