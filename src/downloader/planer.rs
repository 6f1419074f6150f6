use std::sync::Arc;

use crate::downloader::descriptor::Descriptor;
use crate::downloader::resolver::PageResolver;
use crate::error::ItemError;
use crate::progress::{self, ProgressReporter, Unit};
use crate::utils::failures::FailureCollector;
use crate::utils::task_group::TaskGroup;

/// Resolves every landing page of a batch concurrently.
pub struct Planer {
    resolver: PageResolver,
    failures: Arc<FailureCollector>,
}

impl Planer {
    pub fn new(resolver: PageResolver, failures: Arc<FailureCollector>) -> Self {
        Planer { resolver, failures }
    }

    /// Returns one descriptor per input URL, resolved or not. Failures are
    /// recorded in the collector under the URL that caused them.
    pub async fn plan(&self, urls: &[String], progress: &dyn ProgressReporter) -> Vec<Descriptor> {
        let bar = progress::shared(
            progress.add_bar(
                urls.len() as u64,
                "Validating URL & finding download link",
                Unit::Items,
            ),
        );

        let mut group = TaskGroup::unbounded();
        for url in urls {
            let url = url.clone();
            let resolver = self.resolver.clone();
            let failures = Arc::clone(&self.failures);
            let bar = Arc::clone(&bar);
            group.spawn(async move {
                let descriptor = match resolver.resolve(&url).await {
                    Ok(descriptor) => descriptor,
                    Err(err) => {
                        failures.record(url.as_str(), err);
                        Descriptor::unresolved(url)
                    }
                };
                progress::advance_shared(&bar, 1);
                descriptor
            });
        }

        let mut descriptors = Vec::with_capacity(urls.len());
        for (url, result) in urls.iter().zip(group.join_all().await) {
            match result {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(err) => {
                    self.failures
                        .record(url.as_str(), ItemError::Worker(err.to_string()));
                    descriptors.push(Descriptor::unresolved(url.as_str()));
                }
            }
        }
        tracing::info!(
            total = descriptors.len(),
            resolved = descriptors.iter().filter(|d| d.is_resolved()).count(),
            "resolution finished"
        );
        descriptors
    }
}

/// Drops every descriptor that did not resolve.
pub fn resolved_only(descriptors: Vec<Descriptor>) -> Vec<Descriptor> {
    descriptors
        .into_iter()
        .filter(Descriptor::is_resolved)
        .collect()
}
