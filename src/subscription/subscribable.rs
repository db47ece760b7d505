// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for accessories that push characteristic updates.

use crate::state::StateChange;
use crate::subscription::SubscriptionId;
use crate::types::{CurrentModeState, PowerState, Thresholds};

/// Trait for types that support event subscriptions.
///
/// Callbacks run synchronously on the task that applied the change, after
/// the state has been updated. They must not block.
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::accessory::Accessory;
/// use mqtt_humidifier::config::AccessoryConfig;
/// use mqtt_humidifier::protocol::MemoryTransport;
/// use mqtt_humidifier::subscription::Subscribable;
///
/// let (transport, _inbound) = MemoryTransport::new();
/// let accessory = Accessory::new(transport, &AccessoryConfig::humidifier("mqtt://localhost"))?;
///
/// let sub_id = accessory.on_mode_state_changed(|mode| {
///     println!("Mode is now {mode:?}");
/// });
///
/// assert!(accessory.unsubscribe(sub_id));
/// # Ok::<(), mqtt_humidifier::Error>(())
/// ```
pub trait Subscribable {
    /// Subscribes to changes of the derived mode state.
    fn on_mode_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(CurrentModeState) + Send + Sync + 'static;

    /// Subscribes to humidity readings.
    ///
    /// Called for every valid reading, whether or not automatic control is
    /// active.
    fn on_humidity_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f32) + Send + Sync + 'static;

    /// Subscribes to confirmed power changes reported by the actuator.
    fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static;

    /// Subscribes to changes of the automatic-control flag.
    fn on_active_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static;

    /// Subscribes to threshold changes.
    fn on_thresholds_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Thresholds) + Send + Sync + 'static;

    /// Subscribes to all state changes.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
