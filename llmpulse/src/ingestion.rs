use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::FeedSource;
use feed_rs::model::Feed;
use feed_rs::parser;
use reqwest::Client;

use crate::model::ContentItem;

pub const FEED_USER_AGENT: &str = "LLMPulse/0.1.0";

/// Fetches a feed from the given source and maps its entries.
///
/// Single attempt, no retries: a failing source is skipped for this run
/// and the caller decides what the failure means.
pub async fn fetch_source(client: &Client, source: &FeedSource) -> Result<Vec<ContentItem>> {
    let response = client
        .get(&source.url)
        .send()
        .await
        .with_context(|| format!("failed to fetch feed '{}'", source.name))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("feed '{}' returned status: {}", source.name, status);
    }

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("failed to read body of feed '{}'", source.name))?;
    let feed = parser::parse(bytes.as_ref())
        .with_context(|| format!("failed to parse feed '{}'", source.name))?;

    Ok(items_from_feed(feed, source, Utc::now()))
}

/// Maps parsed feed entries to content items.
///
/// Timestamp precedence: published, then updated, then `fetched_at`.
/// Missing title/link/summary default to empty strings so downstream
/// stages never see absent fields.
pub fn items_from_feed(feed: Feed, source: &FeedSource, fetched_at: DateTime<Utc>) -> Vec<ContentItem> {
    feed.entries
        .into_iter()
        .map(|entry| {
            let published = entry.published.or(entry.updated).unwrap_or(fetched_at);
            ContentItem {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                link: entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default(),
                raw_summary: entry.summary.map(|t| t.content).unwrap_or_default(),
                published,
                source: source.name.clone(),
                category: source.category,
                ai_summary: None,
            }
        })
        .collect()
}
