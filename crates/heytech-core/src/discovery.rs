// ── Discovery ──
//
// Queues the full query batch and waits for the name stream. When the
// device reports its channel count, discovery ends as soon as that many
// shutters are named; otherwise it waits for the shutter count to stop
// changing.

use std::sync::Arc;

use heytech_api::protocol::query;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::command::Command;
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::Shutter;

/// Everything discovery asks for, in send order.
const DISCOVERY_QUERIES: &[&str] = &[
    query::MAX_CHANNELS,
    query::NAMES,
    query::POSITIONS,
    query::CLIMATE,
    query::AUTOMATION,
    query::GROUPS,
    query::LOGBOOK_COUNT,
    query::JALOUSIE_PARAMS,
    query::SHADING_PARAMS,
    query::WIND_PARAMS,
    query::RAIN_PARAMS,
    query::MODEL,
    query::FIRMWARE,
];

impl Controller {
    /// Query everything the device knows and collect the shutter names.
    ///
    /// Returns the discovered shutters ordered by name. Fails with
    /// [`CoreError::Communication`] when no shutter was named in time.
    pub async fn run_full_discovery(&self) -> Result<Arc<Vec<Arc<Shutter>>>, CoreError> {
        let store = &self.inner.store;
        let timings = &self.inner.config.timings;

        store.begin_discovery();
        let mut max_rx = store.subscribe_max_channels();
        let mut done_rx = store.subscribe_discovery_complete();

        self.execute(Command::Batch(
            DISCOVERY_QUERIES.iter().map(|q| Command::query(*q)).collect(),
        ))?;

        let max_channels =
            match tokio::time::timeout(timings.max_channels_wait, max_rx.wait_for(Option::is_some))
                .await
            {
                Ok(Ok(count)) => *count,
                Ok(Err(_)) => return Err(CoreError::Stopped),
                Err(_) => None,
            };

        match max_channels {
            Some(expected) => {
                let timed_out =
                    tokio::time::timeout(timings.discovery_timeout, done_rx.wait_for(|done| *done))
                        .await
                        .is_err();
                if timed_out {
                    warn!(
                        expected,
                        found = store.shutter_count(),
                        "timed out waiting for all shutter names"
                    );
                }
            }
            None => {
                warn!("channel count not reported, waiting for the name stream to settle");
                self.wait_for_stable_names().await;
            }
        }

        let shutters = store.shutters_snapshot();
        if shutters.is_empty() {
            return Err(CoreError::communication("no shutters discovered"));
        }
        info!(
            shutters = shutters.len(),
            scenarios = store.scenarios_snapshot().len(),
            groups = store.groups_snapshot().len(),
            "discovery finished"
        );
        Ok(shutters)
    }

    /// Wait until the shutter count stayed the same for
    /// `stability_rounds` samples, or `discovery_timeout` elapsed.
    async fn wait_for_stable_names(&self) {
        let store = &self.inner.store;
        let timings = &self.inner.config.timings;
        let deadline = Instant::now() + timings.discovery_timeout;

        let mut last = store.shutter_count();
        let mut stable = 0;
        while stable < timings.stability_rounds && Instant::now() < deadline {
            tokio::time::sleep(timings.stability_interval).await;
            let count = store.shutter_count();
            if count == last && count > 0 {
                stable += 1;
            } else {
                stable = 0;
                last = count;
            }
        }
    }
}
