//! Per-host request pacing.
//!
//! Requests to different hosts never wait on each other; requests to the
//! same host are spaced at least `delay` apart.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub struct HostPacer {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until `host` may be contacted again.
    ///
    /// The slot is reserved while the lock is held and the sleep happens
    /// after it is released, so concurrent callers queue up in order.
    pub async fn wait(&self, host: &str) {
        let now = Instant::now();
        let start = {
            let mut slots = self.next_slot.lock().await;
            let start = slots.get(host).copied().filter(|t| *t > now).unwrap_or(now);
            slots.insert(host.to_string(), start + self.delay);
            start
        };
        if start > now {
            debug!(host, wait_ms = (start - now).as_millis() as u64, "pacing request");
            tokio::time::sleep_until(start).await;
        }
    }
}
