/// One input URL on its way through a batch.
///
/// Built once by the resolution stage and only read afterwards. A resolved
/// descriptor always carries a non-empty download URL and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    page_url: String,
    download_url: String,
    file_name: String,
    resolved: bool,
}

impl Descriptor {
    pub fn unresolved(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            download_url: String::new(),
            file_name: String::new(),
            resolved: false,
        }
    }

    /// Falls back to an unresolved descriptor if either value is empty.
    pub fn resolved(
        page_url: impl Into<String>,
        download_url: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        let download_url = download_url.into();
        let file_name = file_name.into();
        let resolved = !download_url.is_empty() && !file_name.is_empty();
        if !resolved {
            return Self::unresolved(page_url);
        }
        Self {
            page_url: page_url.into(),
            download_url,
            file_name,
            resolved,
        }
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}
