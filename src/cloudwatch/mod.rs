//! CloudWatch, SNS and CloudWatch Logs maintenance operations.
//!
//! Every method follows the same pattern: validate arguments, fetch the
//! object, change it in memory and write it back through the backend.

use std::time::Duration;

use crate::aws::{CloudWatchApi, StaticCredentials, AWS};

mod alarms;
mod dashboards;
pub mod description;
mod logs;
mod sns;

#[cfg(test)]
pub(crate) mod fake;

/// Pause between disabling and renaming an alarm during bulk renames.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

pub struct Session<B = AWS> {
    backend: B,
    region: String,
    settle_delay: Duration,
}

impl Session<AWS> {
    /// Uses the static credentials when all three parts are present, else the
    /// environment's credential chain.
    pub async fn new(region: &str, credentials: &StaticCredentials) -> Self {
        let aws = AWS::new(region, credentials).await;
        Self::with_backend(aws, region)
    }
}

impl<B: CloudWatchApi> Session<B> {
    pub fn with_backend(backend: B, region: &str) -> Self {
        Self {
            backend,
            region: region.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
