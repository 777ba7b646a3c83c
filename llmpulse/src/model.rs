use chrono::{DateTime, Utc};
use common::Category;
use std::collections::BTreeMap;

/// One discovered feed entry, normalized for the pipeline.
///
/// `published` is always concrete: entries missing both published and
/// updated timestamps get the time of fetch. Missing title/link/summary
/// become empty strings, never absent fields.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub title: String,
    pub link: String,
    /// Feed-provided description or summary, possibly empty
    pub raw_summary: String,
    pub published: DateTime<Utc>,
    pub source: String,
    pub category: Category,
    /// One-sentence synthesized summary; None until per-item summarization runs
    pub ai_summary: Option<String>,
}

/// Ranked items per category, most-recent-first, rebuilt every run.
pub type CategoryBuckets = BTreeMap<Category, Vec<ContentItem>>;

/// Everything the renderer needs for one run.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub buckets: CategoryBuckets,
    pub summaries: BTreeMap<Category, String>,
    pub insights: String,
}

impl ReportData {
    pub fn total_items(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
