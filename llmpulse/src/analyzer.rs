use common::Category;
use tracing::warn;

use crate::llm::{LlmProvider, LlmRequest};
use crate::model::{CategoryBuckets, ContentItem};

/// Fixed response when no category has any item.
pub const NO_SIGNIFICANT_UPDATES: &str = "No significant AI/LLM updates this period.";

/// At most this many items are formatted into a category prompt.
const CATEGORY_PROMPT_ITEM_CAP: usize = 15;
/// Titles per category in the cross-category insight digest.
const INSIGHT_TITLES_PER_CATEGORY: usize = 5;
/// Raw-summary clip inside the category prompt body.
const PROMPT_SUMMARY_CHARS: usize = 200;

/// Fixed response for an empty category bucket.
pub fn no_updates_message(category: Category) -> String {
    format!("No updates in {} this period.", category.label())
}

/// Produces a short bulleted summary for one category bucket.
///
/// Empty buckets and inference failures never raise: the former returns
/// the fixed no-updates string without an inference call, the latter an
/// explicit error marker that stays visible in the rendered report.
pub async fn summarize_category(
    provider: &dyn LlmProvider,
    items: &[ContentItem],
    category: Category,
    max_tokens: usize,
) -> String {
    if items.is_empty() {
        return no_updates_message(category);
    }

    let request = LlmRequest {
        prompt: build_category_prompt(&format_items_for_prompt(items), category),
        max_tokens: Some(max_tokens),
        temperature: None,
        timeout_seconds: None,
    };

    match provider.generate(request).await {
        Ok(response) => response.content,
        Err(e) => {
            warn!(%category, error = %e, "category summarization failed");
            format!("Summary generation failed: {e}")
        }
    }
}

/// Produces exactly three cross-category insights from the week's titles.
pub async fn generate_insights(
    provider: &dyn LlmProvider,
    buckets: &CategoryBuckets,
    max_tokens: usize,
) -> String {
    let total: usize = buckets.values().map(Vec::len).sum();
    if total == 0 {
        return NO_SIGNIFICANT_UPDATES.to_string();
    }

    let mut digest = String::new();
    for (category, items) in buckets {
        if items.is_empty() {
            continue;
        }
        digest.push_str(&format!("\n## {} ({} items)\n", category.label(), items.len()));
        for item in items.iter().take(INSIGHT_TITLES_PER_CATEGORY) {
            digest.push_str(&format!("- {}\n", item.title));
        }
    }

    let prompt = format!(
        "Based on this week's AI/LLM activity below, produce exactly 3 concise insights:\n\
         {digest}\n\
         Requirements:\n\
         1. Output exactly 3 core insights, no more\n\
         2. Each insight is 1-2 sentences, at most 50 words\n\
         3. Cover technology trends, industry impact and notable innovation\n\
         4. Be precise and direct\n\n\
         Output format:\n\
         1. **Insight title**: core point (1-2 sentences)\n\
         2. **Insight title**: core point (1-2 sentences)\n\
         3. **Insight title**: core point (1-2 sentences)"
    );

    let request = LlmRequest {
        prompt,
        max_tokens: Some(max_tokens),
        temperature: None,
        timeout_seconds: None,
    };

    match provider.generate(request).await {
        Ok(response) => response.content,
        Err(e) => {
            warn!(error = %e, "insight generation failed");
            format!("Insight generation failed: {e}")
        }
    }
}

fn format_items_for_prompt(items: &[ContentItem]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().take(CATEGORY_PROMPT_ITEM_CAP).enumerate() {
        out.push_str(&format!(
            "{}. Title: {}\n   Source: {}\n   Summary: {}...\n   Link: {}\n\n",
            idx + 1,
            item.title,
            item.source,
            clip(&item.raw_summary, PROMPT_SUMMARY_CHARS),
            item.link
        ));
    }
    out
}

fn build_category_prompt(content: &str, category: Category) -> String {
    // The startups bucket gets a domain-tuned prompt filtering toward
    // productivity tooling and AIOps.
    if category == Category::Startups {
        return format!(
            "You are an analyst covering AI/LLM productivity tooling and AIOps. \
             Produce a concise weekly summary of the {} category from the items below.\n\n\
             Item list:\n{content}\n\
             Focus areas:\n\
             - LLM productivity tools (coding assistants, writing tools, knowledge management, automation)\n\
             - AIOps tools (intelligent operations, monitoring, log analysis, failure prediction)\n\
             - DevOps + AI (CI/CD, test automation, deployment optimization)\n\
             - Developer tools (IDE plugins, API tooling, debugging assistants)\n\n\
             Requirements:\n\
             1. Select only items relevant to productivity tooling or AIOps; drop the rest\n\
             2. Extract 3-5 key points, no more\n\
             3. Cover product launches, feature updates, funding and technical innovation\n\
             4. Each point: tool name plus its core feature or update, 20-30 words\n\
             5. Keep it tight and practical\n\n\
             Output format:\n\
             - **Tool/product name**: core feature or update. [link](url)\n\
             - **Tool/product name**: core feature or update. [link](url)\n\n\
             If nothing qualifies, answer exactly: No productivity tooling or AIOps updates this week.",
            category.label()
        );
    }

    format!(
        "You are an AI/LLM industry analyst. Produce a concise weekly summary of the {} \
         category from the items below.\n\n\
         Item list:\n{content}\n\
         Requirements:\n\
         1. Extract only the 3-5 most important points, no more\n\
         2. Each point is one sentence of 20-30 words, without extra detail\n\
         3. Use terse bullet points\n\
         4. Highlight the most impactful technical developments\n\n\
         Output format:\n\
         - **Point title**: one-sentence core content. [link](url)\n\
         - **Point title**: one-sentence core content. [link](url)",
        category.label()
    )
}

fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
