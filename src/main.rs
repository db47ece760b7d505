// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `mqtt-humidifier` - runs the configured accessories until interrupted.
//!
//! Each `[[accessory]]` gets its own broker connection, control loop and
//! refresh scheduler. Characteristic updates are written to the log.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mqtt_humidifier::accessory::{
    Accessory, AccessoryTasks, Active, CurrentHumidifierDehumidifierState,
};
use mqtt_humidifier::config::{AccessoryConfig, BridgeConfig, DEFAULT_CONFIG_FILE};
use mqtt_humidifier::protocol::MqttTransport;
use mqtt_humidifier::subscription::Subscribable;

/// Threshold control of MQTT humidifiers and dehumidifiers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = BridgeConfig::load(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        config = %args.config.display(),
        accessories = config.accessories.len(),
        "Starting bridge"
    );

    let mut running = Vec::with_capacity(config.accessories.len());
    for accessory_config in &config.accessories {
        running.push(start_accessory(accessory_config).await?);
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupted, shutting down");

    for (accessory, tasks) in running {
        tasks.abort();
        if let Err(e) = accessory.controller().transport().disconnect().await {
            tracing::warn!(accessory = %accessory.name(), error = %e, "Disconnect failed");
        }
    }
    Ok(())
}

async fn start_accessory(
    config: &AccessoryConfig,
) -> mqtt_humidifier::Result<(Accessory<MqttTransport>, AccessoryTasks)> {
    let url = config.mqtt_url.as_deref().unwrap_or_default();
    let mut builder = MqttTransport::builder().broker_url(url)?;
    if let Some(username) = &config.mqtt_username {
        builder = builder.credentials(username, config.mqtt_password.as_deref().unwrap_or_default());
    }
    if let Some(client_id) = &config.mqtt_client_id {
        builder = builder.client_id(client_id);
    }

    let (transport, inbound) = builder.build().await?;
    let accessory = Accessory::new(transport, config)?;
    log_characteristic_updates(&accessory);

    let tasks = accessory.start(inbound).await?;
    Ok((accessory, tasks))
}

fn log_characteristic_updates(accessory: &Accessory<MqttTransport>) {
    let name = accessory.name().to_string();
    accessory.on_mode_state_changed(move |mode| {
        tracing::info!(
            accessory = %name,
            characteristic = "CurrentHumidifierDehumidifierState",
            value = CurrentHumidifierDehumidifierState::from(mode).value(),
            "Characteristic updated"
        );
    });

    let name = accessory.name().to_string();
    accessory.on_humidity_changed(move |humidity| {
        tracing::info!(
            accessory = %name,
            characteristic = "CurrentRelativeHumidity",
            value = humidity,
            "Characteristic updated"
        );
    });

    let name = accessory.name().to_string();
    accessory.on_active_changed(move |active| {
        tracing::info!(
            accessory = %name,
            characteristic = "Active",
            value = Active::from(active).value(),
            "Characteristic updated"
        );
    });

    let name = accessory.name().to_string();
    accessory.on_thresholds_changed(move |thresholds| {
        tracing::info!(
            accessory = %name,
            humidifier = thresholds.humidifier(),
            dehumidifier = thresholds.dehumidifier(),
            "Thresholds characteristics updated"
        );
    });
}
