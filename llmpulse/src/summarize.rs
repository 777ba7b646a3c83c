use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::{LlmProvider, LlmRequest};
use crate::model::ContentItem;
use crate::pacing::Pacing;
use crate::scraping;

/// Returned instead of calling the LLM when the input is too thin to
/// summarize.
pub const INSUFFICIENT_CONTENT: &str = "Not enough content to summarize.";

/// Placeholder the renderer shows for items that never got a summary.
pub const NO_SUMMARY: &str = "No summary available.";

/// Minimum trimmed input length worth an inference call.
const MIN_INPUT_CHARS: usize = 50;
/// Prompt input clip, bounding inference cost per item.
const PROMPT_INPUT_CHARS: usize = 1500;
/// Length of the degraded truncation fallback.
const FALLBACK_CHARS: usize = 100;
const SUMMARY_MAX_TOKENS: usize = 200;

/// Per-item summarizer: picks the best available text for an item, asks
/// the LLM for a one-sentence summary and degrades deterministically when
/// extraction or inference fails.
pub struct ItemSummarizer {
    provider: Arc<dyn LlmProvider>,
    http: reqwest::Client,
    pacing: Pacing,
}

impl ItemSummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, http: reqwest::Client, pacing: Pacing) -> Self {
        Self {
            provider,
            http,
            pacing,
        }
    }

    /// Attaches `ai_summary` to every item in the bucket, in order, with
    /// the politeness delay between successive items.
    pub async fn summarize_batch(&self, items: &mut [ContentItem]) {
        let total = items.len();
        for (idx, item) in items.iter_mut().enumerate() {
            info!(n = idx + 1, total, title = %clip(&item.title, 50), "summarizing item");
            let summary = self.summarize_item(item).await;
            item.ai_summary = Some(summary);
            if idx + 1 < total {
                self.pacing.between_summaries().await;
            }
        }
    }

    /// Text priority: extracted article body, then the raw feed summary.
    /// Inputs under the minimum length return the insufficiency marker
    /// without an inference call.
    pub async fn summarize_item(&self, item: &ContentItem) -> String {
        let is_paper = scraping::is_paper_link(&item.link);
        let body = scraping::extract(&self.http, item).await;
        let text = if body.trim().is_empty() {
            item.raw_summary.clone()
        } else {
            body
        };

        if text.trim().chars().count() < MIN_INPUT_CHARS {
            return INSUFFICIENT_CONTENT.to_string();
        }

        let request = LlmRequest {
            prompt: build_prompt(&text, is_paper),
            max_tokens: Some(SUMMARY_MAX_TOKENS),
            temperature: None,
            timeout_seconds: None,
        };

        match self.provider.generate(request).await {
            Ok(response) => clean_summary(&response.content),
            Err(e) => {
                warn!(title = %clip(&item.title, 50), error = %e, "item summarization failed, using truncated text");
                fallback_summary(&text)
            }
        }
    }
}

fn build_prompt(text: &str, is_paper: bool) -> String {
    let clipped = clip(text, PROMPT_INPUT_CHARS);
    if is_paper {
        format!(
            "Summarize the core contribution of this academic paper in one short sentence (roughly 30 to 50 words):\n\n\
             {clipped}\n\n\
             Requirements:\n\
             - One sentence stating the key innovation or main finding\n\
             - Concise, technical language\n\
             - Do not open with \"This paper\" or \"The authors\"\n\
             - State the core content directly\n\n\
             Example: Proposes a multimodal retrieval method that improves accuracy on long-context question answering.\n"
        )
    } else {
        format!(
            "Summarize the main point of this article in one short sentence (roughly 30 to 50 words):\n\n\
             {clipped}\n\n\
             Requirements:\n\
             - One sentence covering the article's main news or argument\n\
             - Plain, accessible language\n\
             - Do not open with \"This article\" or \"The author\"\n\
             - State the core content directly\n\n\
             Example: OpenAI released a new batch API that cuts inference costs for offline workloads.\n"
        )
    }
}

/// Strips whitespace and surrounding quote characters from the model output.
fn clean_summary(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Deterministic degraded summary: leading text plus an ellipsis.
fn fallback_summary(text: &str) -> String {
    format!("{}...", clip(text.trim(), FALLBACK_CHARS))
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
