//! Turning the command-line input into the list of landing-page URLs.

use std::path::{Path, PathBuf};

use crate::error::BatchError;

pub enum UrlSource {
    /// Text file, one URL per line.
    File(PathBuf),
    /// Comma-separated URLs.
    Links(String),
}

pub async fn read_urls(source: &UrlSource) -> Result<Vec<String>, BatchError> {
    let urls = match source {
        UrlSource::File(path) => urls_from_file(path).await?,
        UrlSource::Links(links) => urls_from_links(links),
    };
    if urls.is_empty() {
        return Err(BatchError::EmptyInput);
    }
    Ok(urls)
}

async fn urls_from_file(path: &Path) -> Result<Vec<String>, BatchError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(non_blank(content.lines()))
}

fn urls_from_links(links: &str) -> Vec<String> {
    non_blank(links.split(','))
}

fn non_blank<'a>(pieces: impl Iterator<Item = &'a str>) -> Vec<String> {
    pieces
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}
