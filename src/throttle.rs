use std::time::Duration;

use tracing::info;

/// Pauses a pass after every `batch_size` projects to stay under provider rate limits
#[derive(Debug)]
pub struct Throttle {
    batch_size: usize,
    pause: Duration,
    processed: usize,
}

impl Throttle {
    pub fn new(batch_size: usize, pause: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pause,
            processed: 0,
        }
    }

    /// Call before each project. Sleeps when the projects already processed form a
    /// complete batch, and reports whether it did.
    pub async fn tick(&mut self) -> bool {
        let due = self.processed > 0 && self.processed % self.batch_size == 0;
        self.processed += 1;

        if due {
            info!(
                processed = self.processed - 1,
                pause_secs = self.pause.as_secs(),
                "Pausing between build request batches"
            );
            tokio::time::sleep(self.pause).await;
        }

        due
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}
