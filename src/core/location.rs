use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use tokio::time::timeout;

use crate::error::Error;
use crate::models::location::{default_location, DetectedLocation, LocationSource, ResolvedLocation};

/// One step of the detection chain. Strategies keep their own error mapping;
/// the resolver only cares about result-or-failure.
#[async_trait]
pub trait LocateStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn source(&self) -> LocationSource;
    async fn locate(&self) -> Result<ResolvedLocation, Error>;
}

/// First-success-wins over an ordered strategy list, each step time-boxed.
/// Exhaustion resolves to the default location; detection never fails.
pub struct LocationResolver {
    strategies: Vec<Box<dyn LocateStrategy>>,
    step_timeout: Duration,
}

impl LocationResolver {
    pub fn new(step_timeout: Duration) -> Self {
        Self {
            strategies: Vec::new(),
            step_timeout,
        }
    }

    pub fn with(mut self, strategy: Box<dyn LocateStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub async fn detect(&self) -> DetectedLocation {
        for strategy in &self.strategies {
            match timeout(self.step_timeout, strategy.locate()).await {
                Ok(Ok(location)) => {
                    return DetectedLocation {
                        location,
                        source: strategy.source(),
                    }
                }
                Ok(Err(e)) => warn!("location strategy {} failed: {}", strategy.name(), e),
                Err(_) => warn!(
                    "location strategy {} timed out after {:?}",
                    strategy.name(),
                    self.step_timeout
                ),
            }
        }
        warn!("all location strategies failed, using default location");
        DetectedLocation {
            location: default_location(),
            source: LocationSource::Default,
        }
    }
}
