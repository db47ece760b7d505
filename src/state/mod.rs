// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory state management types.
//!
//! [`DeviceState`] holds the in-memory model of one accessory, while
//! [`StateChange`] represents individual changes that can be applied to it
//! and dispatched to subscribers.
//!
//! # Examples
//!
//! ```
//! use mqtt_humidifier::state::{DeviceState, StateChange};
//! use mqtt_humidifier::types::{DeviceKind, PowerState};
//!
//! let mut state = DeviceState::new(DeviceKind::Humidifier);
//! state.apply(&StateChange::Power(PowerState::On));
//!
//! assert_eq!(state.power(), PowerState::On);
//! ```

mod device_state;
mod state_change;

pub use device_state::DeviceState;
pub use state_change::StateChange;
