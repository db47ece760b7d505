// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-accessory control loop state and event handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::policy::candidate_power;
use crate::config::AccessoryConfig;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::{Delivery, InboundMessage, Route, TopicRouter, Transport};
use crate::state::{DeviceState, StateChange};
use crate::subscription::CallbackRegistry;
use crate::telemetry::HumidityFormat;
use crate::types::{DeviceKind, PowerState, Thresholds};

/// Payload of a refresh request.
pub const REFRESH_PAYLOAD: &str = "refresh";

/// The control loop of one accessory.
///
/// A controller owns the accessory state and is the only place where it is
/// mutated. Every event takes the state lock, applies its change, enqueues
/// any resulting publish and dispatches notifications before releasing it,
/// so commands leave in the order their causes arrived.
///
/// Inbound messages go through [`Controller::handle_message`]; the facade
/// and the refresh scheduler call the remaining methods.
pub struct Controller<T> {
    name: String,
    transport: T,
    router: TopicRouter,
    power_command_topic: String,
    refresh_topic: Option<String>,
    humidity_format: HumidityFormat,
    delivery_timeout: Duration,
    state: Mutex<DeviceState>,
    callbacks: Arc<CallbackRegistry>,
}

impl<T: Transport> Controller<T> {
    /// Creates a controller for an accessory.
    ///
    /// The controller starts active, with power `Off` and no humidity.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the accessory configuration is invalid.
    pub fn new(transport: T, config: &AccessoryConfig) -> Result<Self> {
        config.validate()?;
        let thresholds = config.thresholds()?;

        Ok(Self {
            name: config.name.clone(),
            transport,
            router: TopicRouter::new(&config.power_topic, &config.humidity_topic),
            power_command_topic: config.power_command_topic.clone(),
            refresh_topic: config.refresh_humidity_topic.clone(),
            humidity_format: config.humidity_format.clone(),
            delivery_timeout: config.delivery_timeout(),
            state: Mutex::new(DeviceState::with_thresholds(config.kind, thresholds)),
            callbacks: Arc::new(CallbackRegistry::new()),
        })
    }

    /// Returns the accessory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device kind.
    pub async fn kind(&self) -> DeviceKind {
        self.state.lock().await.kind()
    }

    /// Returns the topic router.
    #[must_use]
    pub fn router(&self) -> &TopicRouter {
        &self.router
    }

    /// Returns the refresh topic, if refresh requests are enabled.
    #[must_use]
    pub fn refresh_topic(&self) -> Option<&str> {
        self.refresh_topic.as_deref()
    }

    /// Returns how long awaited publishes may take.
    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    /// Returns the callback registry notifications are dispatched to.
    #[must_use]
    pub fn callbacks(&self) -> &Arc<CallbackRegistry> {
        &self.callbacks
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> DeviceState {
        self.state.lock().await.clone()
    }

    /// Subscribes the transport to the power and humidity topics.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if a subscription cannot be enqueued.
    pub async fn subscribe(&self) -> Result<()> {
        for topic in self.router.topics() {
            self.transport.subscribe(topic).await?;
        }
        tracing::debug!(accessory = %self.name, "Subscribed to accessory topics");
        Ok(())
    }

    /// Handles one inbound message.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownTopic` if the topic is not routed to this accessory
    /// - `Error::Parse` if a humidity payload cannot be parsed
    /// - `Error::Protocol` if a power command cannot be enqueued
    ///
    /// State is left unchanged in the first two cases.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<()> {
        match self.router.route(&message.topic) {
            Some(Route::Power) => {
                self.handle_power(&message.payload).await;
                Ok(())
            }
            Some(Route::Humidity) => self.handle_humidity(&message.payload).await,
            None => Err(Error::UnknownTopic {
                topic: message.topic.clone(),
            }),
        }
    }

    async fn handle_power(&self, payload: &str) {
        let power = PowerState::from_payload(payload);

        let mut state = self.state.lock().await;
        if state.apply(&StateChange::Power(power)) {
            tracing::info!(accessory = %self.name, power = %power, "Actuator power changed");
        } else {
            tracing::debug!(accessory = %self.name, power = %power, "Actuator power confirmed");
        }

        self.callbacks
            .dispatch(&StateChange::power_report(power, state.mode_state()));
    }

    async fn handle_humidity(&self, payload: &str) -> Result<()> {
        let humidity = self.humidity_format.parse(payload)?;

        let mut state = self.state.lock().await;
        state.apply(&StateChange::Humidity(humidity));
        tracing::debug!(accessory = %self.name, humidity, "Humidity recorded");
        self.callbacks.dispatch(&StateChange::Humidity(humidity));

        if !state.is_active() {
            return Ok(());
        }

        let current = state.power();
        let candidate = candidate_power(state.kind(), humidity, state.thresholds(), current);
        if candidate == current {
            return Ok(());
        }

        tracing::info!(
            accessory = %self.name,
            humidity,
            command = %candidate,
            "Threshold crossed, requesting power change"
        );
        // `power` only follows the actuator's report on the power topic.
        drop(self.publish(&self.power_command_topic, candidate.as_str()).await?);
        Ok(())
    }

    /// Publishes a refresh request if a refresh topic is configured.
    ///
    /// Returns `None` when refresh requests are disabled.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the request cannot be enqueued.
    pub async fn request_refresh(&self) -> Result<Option<Delivery>> {
        let _state = self.state.lock().await;
        self.publish_refresh().await
    }

    /// Publishes a refresh request if automatic control is active.
    ///
    /// Returns whether a request was published.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the request cannot be enqueued.
    pub async fn scheduled_refresh(&self) -> Result<bool> {
        let state = self.state.lock().await;
        if !state.is_active() {
            tracing::trace!(accessory = %self.name, "Inactive, skipping scheduled refresh");
            return Ok(false);
        }
        Ok(self.publish_refresh().await?.is_some())
    }

    /// Enables or disables automatic control.
    ///
    /// Enabling requests a fresh reading so control resumes promptly;
    /// disabling commands the actuator off. The returned delivery tracks
    /// that publish, or is `None` when enabling without a refresh topic.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the publish cannot be enqueued. The
    /// flag is updated regardless.
    pub async fn set_active(&self, active: bool) -> Result<Option<Delivery>> {
        let mut state = self.state.lock().await;
        if state.apply(&StateChange::Active(active)) {
            tracing::info!(accessory = %self.name, active, "Automatic control toggled");
        }
        self.callbacks.dispatch(&StateChange::Active(active));

        if active {
            self.publish_refresh().await
        } else {
            let delivery = self
                .publish(&self.power_command_topic, PowerState::Off.as_str())
                .await?;
            Ok(Some(delivery))
        }
    }

    /// Replaces the humidifier threshold.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the resulting pair is invalid, leaving the
    /// thresholds unchanged. The follow-up refresh request is best effort.
    pub async fn set_humidifier_threshold(&self, value: f32) -> Result<Thresholds> {
        self.update_thresholds(|t| t.with_humidifier(value)).await
    }

    /// Replaces the dehumidifier threshold.
    ///
    /// # Errors
    ///
    /// Same as [`Controller::set_humidifier_threshold`].
    pub async fn set_dehumidifier_threshold(&self, value: f32) -> Result<Thresholds> {
        self.update_thresholds(|t| t.with_dehumidifier(value)).await
    }

    async fn update_thresholds<F>(&self, update: F) -> Result<Thresholds>
    where
        F: FnOnce(&Thresholds) -> std::result::Result<Thresholds, crate::error::ValueError>,
    {
        let mut state = self.state.lock().await;
        let thresholds = update(&state.thresholds())?;

        state.apply(&StateChange::Thresholds(thresholds));
        tracing::info!(
            accessory = %self.name,
            humidifier = thresholds.humidifier(),
            dehumidifier = thresholds.dehumidifier(),
            "Thresholds updated"
        );
        self.callbacks
            .dispatch(&StateChange::Thresholds(thresholds));

        // Re-evaluation happens when the fresh reading arrives. The new
        // thresholds are already in effect, so a failed request is not an error.
        if let Err(e) = self.publish_refresh().await {
            tracing::warn!(accessory = %self.name, error = %e, "Refresh after threshold change failed");
        }
        Ok(thresholds)
    }

    /// Publishes an ON command without touching `power`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the command cannot be enqueued.
    pub async fn power_on_startup(&self) -> Result<Delivery> {
        let _state = self.state.lock().await;
        tracing::info!(accessory = %self.name, "Sending startup power command");
        self.publish(&self.power_command_topic, PowerState::On.as_str())
            .await
    }

    /// Publishes a refresh request. Callers hold the state lock.
    async fn publish_refresh(&self) -> Result<Option<Delivery>> {
        match &self.refresh_topic {
            Some(topic) => Ok(Some(self.publish(topic, REFRESH_PAYLOAD).await?)),
            None => Ok(None),
        }
    }

    async fn publish(&self, topic: &str, payload: &str) -> Result<Delivery> {
        tracing::debug!(accessory = %self.name, topic = %topic, payload = %payload, "Publishing");
        self.transport
            .publish(topic, payload)
            .await
            .map_err(Error::from)
    }

    /// Waits for an optional delivery within the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the delivery fails or times out.
    pub async fn confirm(&self, delivery: Option<Delivery>) -> Result<()> {
        let Some(delivery) = delivery else {
            return Ok(());
        };
        delivery
            .confirmed_within(self.delivery_timeout)
            .await
            .map_err(|e: ProtocolError| {
                tracing::warn!(accessory = %self.name, error = %e, "Publish not confirmed");
                Error::from(e)
            })
    }
}

impl<T> std::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("router", &self.router)
            .field("power_command_topic", &self.power_command_topic)
            .field("refresh_topic", &self.refresh_topic)
            .finish_non_exhaustive()
    }
}
