// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory facade.
//!
//! [`Accessory`] exposes the get/set operations an accessory platform calls,
//! in the platform's characteristic vocabulary, and forwards characteristic
//! updates through [`Subscribable`].
//!
//! # Examples
//!
//! ```no_run
//! use mqtt_humidifier::accessory::{Accessory, Active};
//! use mqtt_humidifier::config::AccessoryConfig;
//! use mqtt_humidifier::protocol::MqttTransport;
//! use mqtt_humidifier::subscription::Subscribable;
//!
//! # async fn example() -> mqtt_humidifier::Result<()> {
//! let config = AccessoryConfig::humidifier("mqtt://192.168.1.50");
//! let (transport, inbound) = MqttTransport::builder()
//!     .broker_url("mqtt://192.168.1.50")?
//!     .build()
//!     .await?;
//!
//! let accessory = Accessory::new(transport, &config)?;
//! accessory.on_humidity_changed(|h| println!("Humidity: {h}%"));
//! let _tasks = accessory.start(inbound).await?;
//!
//! accessory.set_humidifier_threshold(40.0).await?;
//! accessory.set_active(Active::Inactive).await?;
//! # Ok(())
//! # }
//! ```

mod characteristic;

pub use characteristic::{
    Active, CurrentHumidifierDehumidifierState, TargetHumidifierDehumidifierState,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AccessoryConfig;
use crate::control::{self, Controller};
use crate::error::Result;
use crate::protocol::{InboundMessage, Transport};
use crate::scheduler;
use crate::state::{DeviceState, StateChange};
use crate::subscription::{Subscribable, SubscriptionId};
use crate::types::{CurrentModeState, DeviceKind, PowerState, Thresholds};

/// One humidifier or dehumidifier accessory.
///
/// `Accessory` is cheaply cloneable (via `Arc`); clones share the same
/// control loop.
pub struct Accessory<T> {
    controller: Arc<Controller<T>>,
    kind: DeviceKind,
    refresh_interval: Duration,
    await_refresh_on_read: bool,
    power_on_startup: bool,
}

impl<T> Clone for Accessory<T> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            kind: self.kind,
            refresh_interval: self.refresh_interval,
            await_refresh_on_read: self.await_refresh_on_read,
            power_on_startup: self.power_on_startup,
        }
    }
}

/// Background tasks of a started accessory.
#[derive(Debug)]
pub struct AccessoryTasks {
    /// The control loop consuming inbound messages.
    pub control: JoinHandle<()>,
    /// The refresh scheduler, if the accessory has a refresh topic.
    pub scheduler: Option<JoinHandle<()>>,
}

impl AccessoryTasks {
    /// Aborts all background tasks.
    pub fn abort(&self) {
        self.control.abort();
        if let Some(scheduler) = &self.scheduler {
            scheduler.abort();
        }
    }
}

impl<T: Transport> Accessory<T> {
    /// Creates an accessory on top of a transport.
    ///
    /// Nothing is subscribed or spawned until [`Accessory::start`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(transport: T, config: &AccessoryConfig) -> Result<Self> {
        Ok(Self {
            controller: Arc::new(Controller::new(transport, config)?),
            kind: config.kind,
            refresh_interval: config.refresh_interval(),
            await_refresh_on_read: config.await_refresh_on_read,
            power_on_startup: config.power_on_startup,
        })
    }

    /// Subscribes the accessory topics and spawns its background tasks.
    ///
    /// `inbound` must be the receiver paired with this accessory's
    /// transport. When configured, the startup ON command is published
    /// before the control loop starts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if subscribing or the startup command fails.
    pub async fn start(
        &self,
        inbound: mpsc::UnboundedReceiver<InboundMessage>,
    ) -> Result<AccessoryTasks> {
        self.controller.subscribe().await?;

        if self.power_on_startup {
            // Not awaited: the actuator's echo on the power topic is what counts.
            drop(self.controller.power_on_startup().await?);
        }

        let control = tokio::spawn(control::run(Arc::clone(&self.controller), inbound));
        let scheduler = scheduler::spawn(Arc::clone(&self.controller), self.refresh_interval);

        tracing::info!(
            accessory = %self.controller.name(),
            kind = %self.kind,
            refresh = scheduler.is_some(),
            "Accessory started"
        );

        Ok(AccessoryTasks { control, scheduler })
    }

    /// Returns the accessory name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.controller.name()
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the underlying controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<Controller<T>> {
        &self.controller
    }

    /// Returns a copy of the current state.
    pub async fn state(&self) -> DeviceState {
        self.controller.snapshot().await
    }

    // =========================================================================
    // Active
    // =========================================================================

    /// Returns whether automatic control is enabled.
    pub async fn active(&self) -> Active {
        Active::from(self.state().await.is_active())
    }

    /// Enables or disables automatic control.
    ///
    /// Activating requests a fresh reading; deactivating commands the
    /// actuator off. Either publish is awaited until the broker confirms it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the publish fails or is not confirmed
    /// in time. The flag itself has already changed in that case.
    pub async fn set_active(&self, value: Active) -> Result<()> {
        let delivery = self.controller.set_active(value.is_active()).await?;
        self.controller.confirm(delivery).await
    }

    // =========================================================================
    // Mode
    // =========================================================================

    /// Returns the current mode derived from the confirmed power state.
    pub async fn current_state(&self) -> CurrentHumidifierDehumidifierState {
        self.state().await.mode_state().into()
    }

    /// Returns the target mode, which is always automatic.
    #[must_use]
    pub fn target_state(&self) -> TargetHumidifierDehumidifierState {
        TargetHumidifierDehumidifierState::Auto
    }

    // =========================================================================
    // Humidity
    // =========================================================================

    /// Returns the last recorded humidity and requests a fresh reading.
    ///
    /// With `awaitRefreshOnRead` the refresh request is confirmed before the
    /// value is read; otherwise the value is read first and the request is
    /// sent without waiting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if an awaited refresh request fails.
    pub async fn current_relative_humidity(&self) -> Result<Option<f32>> {
        if self.await_refresh_on_read {
            let delivery = self.controller.request_refresh().await?;
            self.controller.confirm(delivery).await?;
            return Ok(self.state().await.humidity());
        }

        let humidity = self.state().await.humidity();
        match self.controller.request_refresh().await {
            Ok(delivery) => drop(delivery),
            Err(e) => tracing::warn!(
                accessory = %self.name(),
                error = %e,
                "Refresh request on read failed"
            ),
        }
        Ok(humidity)
    }

    // =========================================================================
    // Thresholds
    // =========================================================================

    /// Returns the humidifier threshold.
    pub async fn humidifier_threshold(&self) -> f32 {
        self.state().await.thresholds().humidifier()
    }

    /// Sets the humidifier threshold and requests a fresh reading.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the value is out of range or not below the
    /// dehumidifier threshold.
    pub async fn set_humidifier_threshold(&self, value: f32) -> Result<()> {
        self.controller.set_humidifier_threshold(value).await?;
        Ok(())
    }

    /// Returns the dehumidifier threshold.
    pub async fn dehumidifier_threshold(&self) -> f32 {
        self.state().await.thresholds().dehumidifier()
    }

    /// Sets the dehumidifier threshold and requests a fresh reading.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the value is out of range or not above the
    /// humidifier threshold.
    pub async fn set_dehumidifier_threshold(&self, value: f32) -> Result<()> {
        self.controller.set_dehumidifier_threshold(value).await?;
        Ok(())
    }
}

impl<T> std::fmt::Debug for Accessory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessory")
            .field("controller", &self.controller)
            .field("kind", &self.kind)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Subscribable for Accessory<T> {
    fn on_mode_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(CurrentModeState) + Send + Sync + 'static,
    {
        self.controller.callbacks().on_mode_state_changed(callback)
    }

    fn on_humidity_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        self.controller.callbacks().on_humidity_changed(callback)
    }

    fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static,
    {
        self.controller.callbacks().on_power_changed(callback)
    }

    fn on_active_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.controller.callbacks().on_active_changed(callback)
    }

    fn on_thresholds_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Thresholds) + Send + Sync + 'static,
    {
        self.controller.callbacks().on_thresholds_changed(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.controller.callbacks().on_state_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.controller.callbacks().unsubscribe(id)
    }
}
