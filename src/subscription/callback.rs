// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for accessory state subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::StateChange;
use crate::types::{CurrentModeState, PowerState, Thresholds};

/// Unique identifier for a subscription.
///
/// This ID is returned when creating a subscription and can be used to
/// unsubscribe later. IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type PowerCallback = Arc<dyn Fn(PowerState) + Send + Sync>;
type ModeStateCallback = Arc<dyn Fn(CurrentModeState) + Send + Sync>;
type HumidityCallback = Arc<dyn Fn(f32) + Send + Sync>;
type ActiveCallback = Arc<dyn Fn(bool) + Send + Sync>;
type ThresholdsCallback = Arc<dyn Fn(Thresholds) + Send + Sync>;
type StateChangedCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;

type Slots<C> = RwLock<HashMap<SubscriptionId, C>>;

/// Registry for managing accessory subscription callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability. Callbacks are wrapped
/// in `Arc` and snapshotted before they run, so a callback may subscribe or
/// unsubscribe without deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    power_callbacks: Slots<PowerCallback>,
    mode_state_callbacks: Slots<ModeStateCallback>,
    humidity_callbacks: Slots<HumidityCallback>,
    active_callbacks: Slots<ActiveCallback>,
    thresholds_callbacks: Slots<ThresholdsCallback>,
    /// Generic state change callbacks (receives all changes).
    state_changed_callbacks: Slots<StateChangedCallback>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            power_callbacks: RwLock::new(HashMap::new()),
            mode_state_callbacks: RwLock::new(HashMap::new()),
            humidity_callbacks: RwLock::new(HashMap::new()),
            active_callbacks: RwLock::new(HashMap::new()),
            thresholds_callbacks: RwLock::new(HashMap::new()),
            state_changed_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn register<C>(&self, slots: &Slots<C>, callback: C) -> SubscriptionId {
        let id = self.next_id();
        slots.write().insert(id, callback);
        id
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for confirmed power changes.
    pub fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static,
    {
        let callback: PowerCallback = Arc::new(callback);
        self.register(&self.power_callbacks, callback)
    }

    /// Registers a callback for mode state changes.
    pub fn on_mode_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(CurrentModeState) + Send + Sync + 'static,
    {
        let callback: ModeStateCallback = Arc::new(callback);
        self.register(&self.mode_state_callbacks, callback)
    }

    /// Registers a callback for humidity readings.
    pub fn on_humidity_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        let callback: HumidityCallback = Arc::new(callback);
        self.register(&self.humidity_callbacks, callback)
    }

    /// Registers a callback for changes of the automatic-control flag.
    pub fn on_active_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let callback: ActiveCallback = Arc::new(callback);
        self.register(&self.active_callbacks, callback)
    }

    /// Registers a callback for threshold changes.
    pub fn on_thresholds_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Thresholds) + Send + Sync + 'static,
    {
        let callback: ThresholdsCallback = Arc::new(callback);
        self.register(&self.thresholds_callbacks, callback)
    }

    /// Registers a callback for all state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let callback: StateChangedCallback = Arc::new(callback);
        self.register(&self.state_changed_callbacks, callback)
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.power_callbacks.write().remove(&id).is_some()
            || self.mode_state_callbacks.write().remove(&id).is_some()
            || self.humidity_callbacks.write().remove(&id).is_some()
            || self.active_callbacks.write().remove(&id).is_some()
            || self.thresholds_callbacks.write().remove(&id).is_some()
            || self.state_changed_callbacks.write().remove(&id).is_some()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches a state change to relevant callbacks.
    ///
    /// Generic callbacks see every change, including the batch itself;
    /// specific callbacks see the individual changes inside a batch.
    pub fn dispatch(&self, change: &StateChange) {
        for callback in snapshot(&self.state_changed_callbacks) {
            callback(change);
        }

        match change {
            StateChange::Power(power) => {
                for callback in snapshot(&self.power_callbacks) {
                    callback(*power);
                }
            }
            StateChange::ModeState(mode) => {
                for callback in snapshot(&self.mode_state_callbacks) {
                    callback(*mode);
                }
            }
            StateChange::Humidity(humidity) => {
                for callback in snapshot(&self.humidity_callbacks) {
                    callback(*humidity);
                }
            }
            StateChange::Active(active) => {
                for callback in snapshot(&self.active_callbacks) {
                    callback(*active);
                }
            }
            StateChange::Thresholds(thresholds) => {
                for callback in snapshot(&self.thresholds_callbacks) {
                    callback(*thresholds);
                }
            }
            StateChange::Batch(changes) => {
                for nested_change in changes {
                    self.dispatch(nested_change);
                }
            }
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.power_callbacks.read().len()
            + self.mode_state_callbacks.read().len()
            + self.humidity_callbacks.read().len()
            + self.active_callbacks.read().len()
            + self.thresholds_callbacks.read().len()
            + self.state_changed_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

fn snapshot<C: Clone>(slots: &Slots<C>) -> Vec<C> {
    slots.read().values().cloned().collect()
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn registry_power_callback() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = registry.on_power_changed(move |_state| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.callback_count(), 1);

        registry.dispatch(&StateChange::Power(PowerState::On));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.dispatch(&StateChange::Power(PowerState::Off));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_humidity_callback_receives_value() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(None::<f32>));
        let received_clone = received.clone();

        registry.on_humidity_changed(move |h| {
            *received_clone.write() = Some(h);
        });

        registry.dispatch(&StateChange::Humidity(52.5));
        assert_eq!(*received.read(), Some(52.5));
    }

    #[test]
    fn registry_specific_callbacks_only_see_their_kind() {
        let registry = CallbackRegistry::new();
        let modes = Arc::new(RwLock::new(Vec::new()));
        let modes_clone = modes.clone();
        let actives = Arc::new(AtomicU32::new(0));
        let actives_clone = actives.clone();

        registry.on_mode_state_changed(move |m| modes_clone.write().push(m));
        registry.on_active_changed(move |_| {
            actives_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::Humidity(40.0));
        registry.dispatch(&StateChange::ModeState(CurrentModeState::Humidifying));

        assert_eq!(*modes.read(), vec![CurrentModeState::Humidifying]);
        assert_eq!(actives.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn registry_thresholds_callback() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(None::<Thresholds>));
        let received_clone = received.clone();

        registry.on_thresholds_changed(move |t| *received_clone.write() = Some(t));

        let thresholds = Thresholds::new(50.0, 65.0).unwrap();
        registry.dispatch(&StateChange::Thresholds(thresholds));
        assert_eq!(*received.read(), Some(thresholds));
    }

    #[test]
    fn registry_batch_dispatch() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let powers = Arc::new(AtomicU32::new(0));
        let powers_clone = powers.clone();

        registry.on_state_changed(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_power_changed(move |_| {
            powers_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::power_report(
            PowerState::On,
            CurrentModeState::Dehumidifying,
        ));

        // Called for batch + each item = 3
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(powers.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_multiple_callbacks_same_type() {
        let registry = CallbackRegistry::new();
        let counter1 = Arc::new(AtomicU32::new(0));
        let counter2 = Arc::new(AtomicU32::new(0));
        let c1 = counter1.clone();
        let c2 = counter2.clone();

        registry.on_active_changed(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_active_changed(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::Active(false));

        assert_eq!(counter1.load(Ordering::SeqCst), 1);
        assert_eq!(counter2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let id_slot = Arc::new(RwLock::new(None::<SubscriptionId>));

        let registry_clone = registry.clone();
        let id_clone = id_slot.clone();
        let id = registry.on_humidity_changed(move |_| {
            if let Some(id) = *id_clone.read() {
                registry_clone.unsubscribe(id);
            }
        });
        *id_slot.write() = Some(id);

        registry.dispatch(&StateChange::Humidity(50.0));
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_unsubscribe_nonexistent() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn registry_unique_ids() {
        let registry = CallbackRegistry::new();

        let id1 = registry.on_power_changed(|_| {});
        let id2 = registry.on_thresholds_changed(|_| {});
        let id3 = registry.on_state_changed(|_| {});

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_power_changed(|_| {});

        let debug = format!("{registry:?}");
        assert!(debug.contains("CallbackRegistry"));
        assert!(debug.contains("callback_count"));
    }
}
