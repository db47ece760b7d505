// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the crate.
//!
//! - [`PowerState`]: confirmed or requested actuator power
//! - [`DeviceKind`]: humidifier or dehumidifier, fixed per accessory
//! - [`CurrentModeState`]: operating mode derived from power and kind
//! - [`Thresholds`]: validated bounds of the hysteresis band

mod kind;
mod power;
mod thresholds;

pub use kind::{CurrentModeState, DeviceKind};
pub use power::PowerState;
pub use thresholds::{HUMIDITY_MAX, HUMIDITY_MIN, Thresholds};
