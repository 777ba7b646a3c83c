use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::model::ContentItem;

/// Candidate selectors for the main article container, in priority order.
/// First match wins; the whole body is the last resort.
const CONTENT_SELECTORS: [&str; 5] = [
    "article",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
];

/// Elements whose text never belongs to the article body.
const EXCLUDED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Cap on extracted text, bounding downstream prompt cost.
pub const EXTRACT_CHAR_CAP: usize = 3000;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Academic-paper links ship a usable abstract in the feed itself, so
/// scraping them is wasted work.
pub fn is_paper_link(link: &str) -> bool {
    link.contains("arxiv.org")
}

/// Best-effort article body for one item.
///
/// Paper links return the feed abstract without any HTTP request.
/// Everything else is fetched and run through selector-based extraction;
/// any failure degrades to an empty string and the caller falls back to
/// the raw feed summary.
pub async fn extract(client: &Client, item: &ContentItem) -> String {
    if is_paper_link(&item.link) {
        return item.raw_summary.clone();
    }
    if item.link.is_empty() {
        return String::new();
    }
    extract_article_text(client, &item.link).await
}

pub async fn extract_article_text(client: &Client, url: &str) -> String {
    match fetch_page(client, url).await {
        Ok(html) => main_text(&html),
        Err(e) => {
            warn!(%url, error = %e, "article fetch failed, falling back to feed summary");
            String::new()
        }
    }
}

async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
        .context("failed to fetch article page")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("article fetch failed with status: {}", status);
    }

    response.text().await.context("failed to read article page body")
}

/// Extracts visible text from the most likely article container.
pub fn main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let container = CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| document.select(&sel).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|sel| document.select(&sel).next())
        });

    match container {
        Some(root) => visible_text(root).chars().take(EXTRACT_CHAR_CAP).collect(),
        None => String::new(),
    }
}

/// Collects text nodes under `root`, skipping script/style/nav/footer/header
/// subtrees, one line per node.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| EXCLUDED_TAGS.contains(&el.name()))
        });
        if !hidden {
            lines.push(trimmed);
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_links_match_arxiv() {
        assert!(is_paper_link("https://arxiv.org/abs/2401.01234"));
        assert!(is_paper_link("http://export.arxiv.org/abs/2401.01234v2"));
        assert!(!is_paper_link("https://openai.com/blog/some-post"));
        assert!(!is_paper_link(""));
    }

    #[test]
    fn strips_chrome_elements() {
        let html = r#"
            <html><body>
              <header>Site header</header>
              <nav>Menu</nav>
              <article>
                <script>var x = 1;</script>
                <style>p { color: red }</style>
                <p>The actual article text.</p>
                <p>Second paragraph.</p>
              </article>
              <footer>Copyright</footer>
            </body></html>"#;

        let text = main_text(html);
        assert_eq!(text, "The actual article text.\nSecond paragraph.");
    }

    #[test]
    fn selector_priority_order_wins() {
        // Both `main` and `.post-content` are present; no `article`.
        // `main` comes first in the candidate list.
        let html = r#"
            <html><body>
              <div class="post-content"><p>Post content text</p></div>
              <main><p>Main text</p></main>
            </body></html>"#;

        assert_eq!(main_text(html), "Main text");

        // With an `article` element present, it takes precedence.
        let html = r#"
            <html><body>
              <main><p>Main text</p></main>
              <article><p>Article text</p></article>
            </body></html>"#;

        assert_eq!(main_text(html), "Article text");
    }

    #[test]
    fn falls_back_to_body() {
        let html = "<html><body><p>Plain page</p></body></html>";
        assert_eq!(main_text(html), "Plain page");
    }

    #[test]
    fn caps_extracted_length() {
        let long = "word ".repeat(2000);
        let html = format!("<html><body><article><p>{long}</p></article></body></html>");
        let text = main_text(&html);
        assert_eq!(text.chars().count(), EXTRACT_CHAR_CAP);
    }
}
