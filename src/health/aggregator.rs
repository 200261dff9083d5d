// src/health/aggregator.rs
use super::error::{panic_message, AggregateError, AggregatorError};
use super::{HealthComponent, HealthStatus};
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Component name to the status its check produced.
pub type AggregatedHealth = HashMap<String, HealthStatus>;

/// Runs the checks of a fixed set of components concurrently and combines
/// their results into one mapping.
///
/// The aggregator keeps no state between calls. Cloning is cheap and shares
/// the same component list.
#[derive(Clone)]
pub struct HealthAggregator {
    components: Arc<[Arc<dyn HealthComponent>]>,
    check_timeout: Option<Duration>,
}

enum CheckOutcome {
    Status(HealthStatus),
    Failed(anyhow::Error),
    Panicked(String),
    TimedOut(Duration),
}

impl HealthAggregator {
    /// Build an aggregator over `components`.
    ///
    /// Names must be non-empty and unique, otherwise the list is rejected.
    pub fn new(components: Vec<Arc<dyn HealthComponent>>) -> Result<Self, AggregatorError> {
        validate_names(&components)?;

        Ok(Self {
            components: components.into(),
            check_timeout: None,
        })
    }

    /// Treat any check still running after `timeout` as failed.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = Some(timeout);
        self
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|component| component.name())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Check every component concurrently and wait for all of them.
    ///
    /// The first failing check aborts the ones still running; their tasks are
    /// torn down before the error is returned and no partial mapping is kept.
    pub async fn aggregate(&self) -> Result<AggregatedHealth, AggregateError> {
        let started = Instant::now();
        let mut tasks = JoinSet::new();

        for component in self.components.iter() {
            let component = Arc::clone(component);
            let check_timeout = self.check_timeout;

            tasks.spawn(async move {
                let outcome = run_check(component.as_ref(), check_timeout).await;
                (component.name().to_string(), outcome)
            });
        }

        let mut results = AggregatedHealth::with_capacity(self.components.len());

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok((name, CheckOutcome::Status(status))) => {
                    debug!("Component {} reported {}", name, status);
                    results.insert(name, status);
                    continue;
                }
                Ok((component, CheckOutcome::Failed(source))) => {
                    AggregateError::ComponentFailed { component, source }
                }
                Ok((component, CheckOutcome::Panicked(message))) => {
                    AggregateError::ComponentPanicked { component, message }
                }
                Ok((component, CheckOutcome::TimedOut(timeout))) => {
                    AggregateError::Timeout { component, timeout }
                }
                Err(e) => AggregateError::Join(e),
            };

            warn!(
                "Aggregation failed, cancelling {} outstanding checks: {}",
                tasks.len(),
                failure
            );
            tasks.shutdown().await;
            return Err(failure);
        }

        debug!(
            "Aggregated {} components in {:?}",
            results.len(),
            started.elapsed()
        );

        Ok(results)
    }
}

fn validate_names(components: &[Arc<dyn HealthComponent>]) -> Result<(), AggregatorError> {
    let mut seen = HashSet::with_capacity(components.len());

    for (index, component) in components.iter().enumerate() {
        let name = component.name();
        if name.is_empty() {
            return Err(AggregatorError::EmptyComponentName { index });
        }
        if !seen.insert(name) {
            return Err(AggregatorError::DuplicateComponent(name.to_string()));
        }
    }

    Ok(())
}

async fn run_check(
    component: &dyn HealthComponent,
    check_timeout: Option<Duration>,
) -> CheckOutcome {
    let check = AssertUnwindSafe(component.health()).catch_unwind();

    let caught = match check_timeout {
        Some(limit) => match tokio::time::timeout(limit, check).await {
            Ok(caught) => caught,
            Err(_) => return CheckOutcome::TimedOut(limit),
        },
        None => check.await,
    };

    match caught {
        Ok(Ok(status)) => CheckOutcome::Status(status),
        Ok(Err(e)) => CheckOutcome::Failed(e),
        Err(payload) => CheckOutcome::Panicked(panic_message(payload)),
    }
}

impl fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("components", &self.component_names().collect::<Vec<_>>())
            .field("check_timeout", &self.check_timeout)
            .finish()
    }
}
