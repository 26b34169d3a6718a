//! Migration tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of messages encrypted concurrently per chunk
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default pause between chunks
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Migration configuration
///
/// The delay between chunks keeps a long migration from starving the
/// store's other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Messages per chunk
    pub batch_size: usize,
    /// Pause between chunks
    pub batch_delay: Duration,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl MigrationConfig {
    /// Set the chunk size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the pause between chunks
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}
