use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

use crate::utils::error::ViewerError;

/// Source of note markup
pub trait ContentFetcher {
    /// Fetch the markup stored at `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ViewerError>>;
}

/// Serves markup from an in-memory table; unknown urls fail like a 404
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: RefCell<HashMap<String, String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert(url, html);
        self
    }

    pub fn insert(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.borrow_mut().insert(url.into(), html.into());
    }
}

impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ViewerError> {
        self.pages
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| ViewerError::Fetch(format!("HTTP 404: {} not found", url)))
    }
}
