//! Last-analysis cache keyed by page URL and paper id.

use super::types::AnalysisRecord;
use crate::store::{get_typed, set_typed, KeyValueStore, StoreError};
use std::sync::Arc;

const URL_PREFIX: &str = "analysis:url:";
const PAPER_PREFIX: &str = "analysis:paper:";

/// Keeps the most recent analysis of each page in the shared store.
#[derive(Clone)]
pub struct AnalysisCache {
    store: Arc<dyn KeyValueStore>,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store `record` under its URL and paper id. A record with neither is
    /// not cached.
    pub fn record(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        if let Some(url) = &record.url {
            set_typed(self.store.as_ref(), &url_key(url), record)?;
        }
        if let Some(paper_id) = &record.paper_id {
            set_typed(self.store.as_ref(), &paper_key(paper_id), record)?;
        }
        Ok(())
    }

    pub fn lookup_by_url(&self, url: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        get_typed(self.store.as_ref(), &url_key(url))
    }

    pub fn lookup_by_paper(&self, paper_id: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        get_typed(self.store.as_ref(), &paper_key(paper_id))
    }
}

fn url_key(url: &str) -> String {
    format!("{}{}", URL_PREFIX, url.trim_end_matches('/'))
}

fn paper_key(paper_id: &str) -> String {
    format!("{}{}", PAPER_PREFIX, paper_id)
}
