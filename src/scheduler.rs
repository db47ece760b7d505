// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic humidity refresh requests.
//!
//! Some sensors only publish when asked. While an accessory is active the
//! scheduler publishes `refresh` on its refresh topic once per interval;
//! the first request goes out one full interval after start.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::control::Controller;
use crate::protocol::Transport;

/// Spawns the refresh task for a controller.
///
/// Returns `None` without spawning anything when the accessory has no
/// refresh topic.
pub fn spawn<T: Transport>(
    controller: Arc<Controller<T>>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    if controller.refresh_topic().is_none() {
        tracing::debug!(accessory = %controller.name(), "No refresh topic, scheduler disabled");
        return None;
    }

    tracing::debug!(
        accessory = %controller.name(),
        period_secs = period.as_secs(),
        "Starting refresh scheduler"
    );
    Some(tokio::spawn(run(controller, period)))
}

async fn run<T: Transport>(controller: Arc<Controller<T>>, period: Duration) {
    let Some(start) = Instant::now().checked_add(period) else {
        tracing::error!(
            accessory = %controller.name(),
            period_secs = period.as_secs(),
            "Refresh period out of range, scheduler stopped"
        );
        return;
    };
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match controller.scheduled_refresh().await {
            Ok(true) => tracing::debug!(accessory = %controller.name(), "Scheduled refresh sent"),
            Ok(false) => {}
            Err(e) => tracing::warn!(
                accessory = %controller.name(),
                error = %e,
                "Scheduled refresh failed"
            ),
        }
    }
}
