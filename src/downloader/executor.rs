use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::downloader::descriptor::Descriptor;
use crate::error::ItemError;
use crate::progress::{ProgressBar, ProgressReporter, Unit};
use crate::utils::failures::FailureCollector;
use crate::utils::task_group::TaskGroup;

/// Downloads resolved descriptors into a directory.
pub struct Executor {
    client: Client,
    failures: Arc<FailureCollector>,
    max_transfers: Option<usize>,
}

impl Executor {
    pub fn new(
        client: Client,
        failures: Arc<FailureCollector>,
        max_transfers: Option<usize>,
    ) -> Self {
        Executor {
            client,
            failures,
            max_transfers,
        }
    }

    /// Probes sizes one by one, launching a transfer for every item whose
    /// size is known, then waits for all transfers. Returns how many files
    /// were written completely.
    pub async fn execute(
        &self,
        descriptors: Vec<Descriptor>,
        save_path: &Path,
        progress: &dyn ProgressReporter,
    ) -> usize {
        let mut group = TaskGroup::new(self.max_transfers);
        let mut launched = Vec::new();
        // one writer per destination file
        let mut claimed = HashSet::new();

        for descriptor in descriptors {
            let size = match probe_size(&self.client, descriptor.download_url()).await {
                Ok(size) => size,
                Err(err) => {
                    self.failures.record(descriptor.page_url(), err);
                    continue;
                }
            };
            tracing::debug!(page_url = %descriptor.page_url(), size, "size probed");

            if !claimed.insert(descriptor.file_name().to_string()) {
                self.failures.record(
                    descriptor.page_url(),
                    ItemError::FileSystem {
                        path: save_path.join(descriptor.file_name()),
                        source: io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            "another item of this batch writes the same file",
                        ),
                    },
                );
                continue;
            }

            let bar = progress.add_bar(size, descriptor.file_name(), Unit::Bytes);
            let client = self.client.clone();
            let failures = Arc::clone(&self.failures);
            let save_path = save_path.to_path_buf();
            launched.push(descriptor.page_url().to_string());

            group.spawn(async move {
                match transfer(&client, &descriptor, &save_path, bar).await {
                    Ok(written) => {
                        tracing::info!(file = %descriptor.file_name(), written, "download finished");
                        true
                    }
                    Err(err) => {
                        failures.record(descriptor.page_url(), err);
                        false
                    }
                }
            });
        }

        let mut completed = 0;
        for (page_url, result) in launched.iter().zip(group.join_all().await) {
            match result {
                Ok(true) => completed += 1,
                Ok(false) => {}
                Err(err) => self
                    .failures
                    .record(page_url.as_str(), ItemError::Worker(err.to_string())),
            }
        }
        tracing::info!(launched = launched.len(), completed, "Download Completed!");
        completed
    }
}

/// Remote size of `url`, read from the headers of a GET whose body is never
/// consumed.
async fn probe_size(client: &Client, url: &str) -> Result<u64, ItemError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ItemError::fetch(url, e))?;

    if response.status() != StatusCode::OK {
        return Err(ItemError::ServerStatus(response.status().to_string()));
    }

    match response.content_length() {
        Some(size) if size > 0 => Ok(size),
        _ => Err(ItemError::SizeUnknown),
    }
}

async fn transfer(
    client: &Client,
    descriptor: &Descriptor,
    save_path: &Path,
    mut bar: Box<dyn ProgressBar>,
) -> Result<u64, ItemError> {
    let url = descriptor.download_url();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ItemError::fetch(url, e))?;
    if response.status() != StatusCode::OK {
        return Err(ItemError::ServerStatus(response.status().to_string()));
    }

    let path = destination(save_path, descriptor.file_name())?;
    let mut file = fs::File::create(&path)
        .await
        .map_err(|source| ItemError::FileSystem {
            path: path.clone(),
            source,
        })?;

    let interrupted = |source: Box<dyn std::error::Error + Send + Sync>| {
        ItemError::TransferInterrupted {
            path: path.clone(),
            source,
        }
    };

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| interrupted(Box::new(e)))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| interrupted(Box::new(e)))?;
        written += chunk.len() as u64;
        bar.advance(chunk.len() as u64);
    }
    file.sync_all().await.map_err(|e| interrupted(Box::new(e)))?;

    Ok(written)
}

/// `save_path/file_name`, refusing names that would leave `save_path`.
fn destination(save_path: &Path, file_name: &str) -> Result<PathBuf, ItemError> {
    let path = save_path.join(file_name);
    if file_name == "." || file_name == ".." || file_name.contains(['/', '\\']) {
        return Err(ItemError::FileSystem {
            path,
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "file name must not contain path components",
            ),
        });
    }
    Ok(path)
}
