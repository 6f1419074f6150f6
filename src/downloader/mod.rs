mod descriptor;
mod executor;
#[cfg(test)]
pub(crate) mod mock;
mod planer;
mod resolver;

pub use descriptor::Descriptor;
pub use executor::Executor;
pub use planer::{Planer, resolved_only};
pub use resolver::PageResolver;

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::BatchError;
use crate::progress::ProgressReporter;
use crate::utils::failures::{FailureCollector, FailureRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    AllSucceeded,
    AllFailed,
    Partial,
}

/// Summary of a finished batch.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FailureRecord>,
}

impl BatchOutcome {
    fn new(total: usize, failures: Vec<FailureRecord>) -> Self {
        BatchOutcome {
            total,
            succeeded: total.saturating_sub(failures.len()),
            failures,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn status(&self) -> OutcomeStatus {
        if self.failures.is_empty() {
            OutcomeStatus::AllSucceeded
        } else if self.failures.len() >= self.total {
            OutcomeStatus::AllFailed
        } else {
            OutcomeStatus::Partial
        }
    }
}

/// Resolves every page URL, downloads what resolved into `save_path`, and
/// reports what failed. Only setup problems are returned as errors; item
/// failures end up in the outcome.
pub async fn download(
    urls: &[String],
    save_path: &Path,
    config: ServiceConfig,
    progress: &dyn ProgressReporter,
) -> Result<BatchOutcome, BatchError> {
    if urls.is_empty() {
        return Err(BatchError::EmptyInput);
    }
    // an unusable destination fails each transfer on its own, not the batch
    if let Err(err) = tokio::fs::create_dir_all(save_path).await {
        tracing::warn!(dest = %save_path.display(), %err, "cannot create destination");
    }

    let client = config.build_client()?;
    let max_transfers = config.max_transfers;
    let config = Arc::new(config);
    let failures = Arc::new(FailureCollector::new());

    let planer = Planer::new(
        PageResolver::new(client.clone(), Arc::clone(&config)),
        Arc::clone(&failures),
    );
    let descriptors = resolved_only(planer.plan(urls, progress).await);

    let executor = Executor::new(client, Arc::clone(&failures), max_transfers);
    executor.execute(descriptors, save_path, progress).await;

    // both stages have joined; no writer is left
    Ok(BatchOutcome::new(urls.len(), failures.take()))
}
