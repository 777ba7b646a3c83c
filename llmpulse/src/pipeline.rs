use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use common::{Category, Config, OutputFormat};
use tracing::{info, warn};

use crate::llm::LlmProvider;
use crate::model::{CategoryBuckets, ReportData};
use crate::pacing::Pacing;
use crate::summarize::ItemSummarizer;
use crate::{analyzer, ingestion, ranking, report};

/// Result of one pipeline run.
#[derive(Debug)]
pub enum Outcome {
    /// Nothing survived the cutoff window in any category; no report written.
    NoContent,
    /// A report was written to the given path.
    Report(PathBuf),
}

/// Sequences one full run: fetch, rank, summarize, aggregate, render.
///
/// Strictly sequential; every external call completes before the next
/// one starts. Failures inside a stage degrade locally and never abort
/// the run; only unclassified errors (config, report write) propagate.
pub struct Pipeline {
    config: Config,
    provider: Arc<dyn LlmProvider>,
    http: reqwest::Client,
    pacing: Pacing,
}

impl Pipeline {
    pub fn new(config: Config, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        let pacing = Pacing::from_config(&config.pacing);
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.pacing.fetch_timeout_seconds,
            ))
            .user_agent(ingestion::FEED_USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            config,
            provider,
            http,
            pacing,
        })
    }

    pub async fn run(&self) -> Result<Outcome> {
        let mut buckets = self.fetch_all().await;

        let total: usize = buckets.values().map(Vec::len).sum();
        info!(total, "fetch and ranking complete");
        for (category, items) in &buckets {
            info!(%category, count = items.len(), "bucket ready");
        }
        if total == 0 {
            info!("no content survived the cutoff window");
            return Ok(Outcome::NoContent);
        }

        // Per-item summaries, bucket by bucket, in declared category order.
        let summarizer =
            ItemSummarizer::new(self.provider.clone(), self.http.clone(), self.pacing);
        for category in Category::ALL {
            if let Some(items) = buckets.get_mut(&category) {
                if items.is_empty() {
                    continue;
                }
                info!(%category, count = items.len(), "summarizing items");
                summarizer.summarize_batch(items).await;
            }
        }

        // Category summaries for non-empty buckets.
        let mut summaries = BTreeMap::new();
        for category in Category::ALL {
            let items = buckets.get(&category).map(Vec::as_slice).unwrap_or_default();
            if items.is_empty() {
                continue;
            }
            info!(%category, "summarizing category");
            let summary = analyzer::summarize_category(
                self.provider.as_ref(),
                items,
                category,
                self.config.llm.max_tokens,
            )
            .await;
            summaries.insert(category, summary);
        }

        let insights = if self.config.report.generate_insights {
            info!("generating cross-category insights");
            analyzer::generate_insights(self.provider.as_ref(), &buckets, self.config.llm.max_tokens)
                .await
        } else {
            String::new()
        };

        let data = ReportData {
            buckets,
            summaries,
            insights,
        };
        let now = Utc::now();
        let content = match self.config.report.output_format {
            OutputFormat::Markdown => report::render_markdown(&data, now),
            OutputFormat::Html => report::render_html(&data, now),
        };
        let path = report::write_report(
            &self.config.report.output_dir,
            self.config.report.output_format,
            &content,
            now,
        )
        .await?;

        Ok(Outcome::Report(path))
    }

    /// Fetches every configured source, category by category in declared
    /// order, then filters and ranks each bucket. A failing source is
    /// logged and contributes nothing; the politeness delay runs after
    /// every source fetch either way.
    async fn fetch_all(&self) -> CategoryBuckets {
        let cutoff = Utc::now() - Duration::days(self.config.report.days_back);
        let mut buckets = BTreeMap::new();

        for category in Category::ALL {
            let mut collected = Vec::new();
            for source in self.config.sources.for_category(category) {
                info!(source = %source.name, url = %source.url, "fetching feed");
                match ingestion::fetch_source(&self.http, source).await {
                    Ok(items) => {
                        info!(source = %source.name, count = items.len(), "feed fetched");
                        collected.extend(items);
                    }
                    Err(e) => {
                        warn!(source = %source.name, error = %e, "feed fetch failed, skipping source");
                    }
                }
                self.pacing.after_feed_fetch().await;
            }
            buckets.insert(
                category,
                ranking::filter_and_rank(
                    collected,
                    cutoff,
                    self.config.report.max_items_per_category,
                ),
            );
        }

        buckets
    }
}
