use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, LazyLock};
use url::Url;

use crate::config::ServiceConfig;
use crate::downloader::descriptor::Descriptor;
use crate::error::ItemError;
use crate::html;

// Anything shaped like scheme://rest, stopped by whitespace, quotes or tags.
static URL_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b[a-z][a-z0-9+.\-]*://[^\s"'<>`]+"#).expect("static regex")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];
const BRACKETS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// Strips trailing punctuation from a scanned link. A closing bracket goes
/// only when the link has no opener left to match it.
fn trim_candidate(candidate: &str) -> &str {
    let mut link = candidate;
    loop {
        let Some(last) = link.chars().last() else {
            return link;
        };
        let strip = if TRAILING_PUNCTUATION.contains(&last) {
            true
        } else if let Some(&(open, close)) = BRACKETS.iter().find(|(_, c)| *c == last) {
            link.matches(close).count() > link.matches(open).count()
        } else {
            false
        };
        if !strip {
            return link;
        }
        link = &link[..link.len() - last.len_utf8()];
    }
}

/// Turns a landing page into a [`Descriptor`].
#[derive(Clone)]
pub struct PageResolver {
    client: Client,
    config: Arc<ServiceConfig>,
}

impl PageResolver {
    pub fn new(client: Client, config: Arc<ServiceConfig>) -> Self {
        Self { client, config }
    }

    pub async fn resolve(&self, page_url: &str) -> Result<Descriptor, ItemError> {
        if !self.is_service_url(page_url) {
            return Err(ItemError::InvalidUrl(page_url.to_string()));
        }

        let body = self.fetch_page(page_url).await?;

        let download_url = self
            .find_download_url(&body)
            .ok_or(ItemError::DownloadLinkNotFound)?;
        let file_name = html::extract_title(&body).ok_or(ItemError::TitleNotFound)?;

        tracing::debug!(%page_url, %download_url, %file_name, "page resolved");
        Ok(Descriptor::resolved(page_url, download_url, file_name))
    }

    fn is_service_url(&self, page_url: &str) -> bool {
        match Url::parse(page_url) {
            Ok(link) => link.origin() == self.config.origin.origin(),
            Err(_) => false,
        }
    }

    async fn fetch_page(&self, page_url: &str) -> Result<String, ItemError> {
        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|e| ItemError::fetch(page_url, e))?;
        response
            .text()
            .await
            .map_err(|e| ItemError::fetch(page_url, e))
    }

    /// First link in `body` that points at the service's download path.
    fn find_download_url(&self, body: &str) -> Option<String> {
        URL_CANDIDATE
            .find_iter(body)
            .map(|m| trim_candidate(m.as_str()))
            .find(|candidate| self.is_download_link(candidate))
            .map(String::from)
    }

    fn is_download_link(&self, candidate: &str) -> bool {
        match Url::parse(candidate) {
            Ok(link) => {
                link.origin() == self.config.origin.origin()
                    && link.path().starts_with(&self.config.download_prefix)
            }
            Err(_) => false,
        }
    }
}
