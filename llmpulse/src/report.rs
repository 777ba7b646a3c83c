use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use common::{Category, OutputFormat};
use std::path::{Path, PathBuf};

use crate::model::{ContentItem, ReportData};
use crate::summarize::NO_SUMMARY;

const NO_CONTENT: &str = "No content this week.";

/// Renders the full weekly report as Markdown.
pub fn render_markdown(data: &ReportData, now: DateTime<Utc>) -> String {
    let week = now.iso_week().week();
    let date = now.format("%Y-%m-%d");

    let mut out = String::new();
    out.push_str(&format!("# LLMPulse Weekly | Week {week}\n> Generated: {date}\n\n---\n\n"));

    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!(
        "Tracked **{}** notable updates this week:\n\n",
        data.total_items()
    ));
    for category in Category::ALL {
        let count = data.buckets.get(&category).map_or(0, Vec::len);
        out.push_str(&format!("- {}: {} items\n", category.label(), count));
    }
    out.push_str("\n---\n");

    for category in Category::ALL {
        let items = data
            .buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default();
        out.push_str(&format!("\n## {}\n\n", category.label()));
        out.push_str(
            data.summaries
                .get(&category)
                .map(String::as_str)
                .unwrap_or(NO_CONTENT),
        );
        out.push_str("\n\n<details>\n<summary>Full item list</summary>\n\n");
        out.push_str(&format_item_list(items));
        out.push_str("\n\n</details>\n\n---\n");
    }

    out.push_str("\n## Insights\n\n");
    if data.insights.is_empty() {
        out.push_str("No insights this week.");
    } else {
        out.push_str(&data.insights);
    }
    out.push_str("\n\n---\n\n*Generated automatically by LLMPulse*\n");
    out
}

fn format_item_list(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return NO_CONTENT.to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "- **[{}]({})**\n  - Source: {} | Date: {}",
                item.title,
                item.link,
                item.source,
                item.published.format("%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the full weekly report as a self-contained HTML document.
pub fn render_html(data: &ReportData, now: DateTime<Utc>) -> String {
    let week = now.iso_week().week();
    let date = now.format("%Y-%m-%d");

    let mut stats = String::new();
    for category in Category::ALL {
        let count = data.buckets.get(&category).map_or(0, Vec::len);
        stats.push_str(&format!(
            "<div class=\"stat-card\"><div class=\"stat-number\">{count}</div><div class=\"stat-label\">{}</div></div>\n",
            category.label()
        ));
    }

    let mut sections = String::new();
    for category in Category::ALL {
        let items = data
            .buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let summary = data.summaries.get(&category).map(String::as_str);
        sections.push_str(&category_section(category, items, summary));
    }

    let insights_html = if data.insights.is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"insights\"><h2>Insights</h2><div class=\"insights-content\">{}</div></div>\n",
            markdown_to_html(&data.insights)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>LLMPulse Weekly | Week {week}</title>
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; line-height: 1.6; color: #333; background: #667eea; padding: 20px; }}
.container {{ max-width: 1100px; margin: 0 auto; background: white; border-radius: 12px; overflow: hidden; }}
header {{ background: #667eea; color: white; padding: 32px; text-align: center; }}
.stats {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; padding: 24px; background: #f8f9fa; }}
.stat-card {{ background: white; padding: 16px; border-radius: 8px; text-align: center; }}
.stat-number {{ font-size: 1.8em; font-weight: bold; color: #667eea; }}
.section {{ padding: 24px; }}
.section h2 {{ color: #667eea; margin-bottom: 12px; }}
.summary-text {{ background: #f8f9fa; padding: 16px; border-left: 4px solid #667eea; margin-bottom: 16px; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ padding: 8px 10px; border-bottom: 1px solid #eee; text-align: left; vertical-align: top; }}
th {{ background: #f8f9fa; }}
.no-data {{ color: #888; font-style: italic; }}
.insights {{ padding: 24px; background: #f8f9fa; }}
footer {{ padding: 20px; text-align: center; color: #888; }}
</style>
</head>
<body>
<div class="container">
<header><h1>LLMPulse Weekly | Week {week}</h1><p>Generated: {date}</p></header>
<div class="stats">
{stats}</div>
{sections}{insights_html}<footer><p><strong>Generated automatically by LLMPulse</strong></p></footer>
</div>
</body>
</html>"#
    )
}

fn category_section(category: Category, items: &[ContentItem], summary: Option<&str>) -> String {
    if items.is_empty() {
        return format!(
            "<div class=\"section\"><h2>{}</h2><div class=\"no-data\">{NO_CONTENT}</div></div>\n",
            category.label()
        );
    }

    let summary_html = match summary {
        Some(s) if s != NO_CONTENT => format!(
            "<div class=\"summary-text\">{}</div>\n",
            markdown_to_html(s)
        ),
        _ => String::new(),
    };

    let mut rows = String::new();
    for item in items {
        rows.push_str(&format!(
            "<tr><td><a href=\"{}\" target=\"_blank\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            item.link,
            item.title,
            item.ai_summary.as_deref().unwrap_or(NO_SUMMARY),
            item.source,
            item.published.format("%m-%d")
        ));
    }

    format!(
        "<div class=\"section\"><h2>{}</h2>\n{summary_html}\
         <table><thead><tr><th style=\"width: 30%;\">Title</th><th style=\"width: 35%;\">Key Point</th>\
         <th style=\"width: 20%;\">Source</th><th style=\"width: 15%;\">Date</th></tr></thead>\n\
         <tbody>\n{rows}</tbody></table></div>\n",
        category.label()
    )
}

/// Minimal Markdown-to-HTML transform for LLM-produced summary text.
///
/// Rule order is observable behavior: headings, then bold, then links,
/// then line breaks.
pub fn markdown_to_html(markdown: &str) -> String {
    let html = convert_headings(markdown);
    let html = convert_bold(&html);
    let html = convert_links(&html);
    html.replace("\n\n", "<br><br>").replace('\n', "<br>")
}

fn convert_headings(text: &str) -> String {
    text.lines()
        .map(|line| match line.strip_prefix("### ") {
            Some(rest) => format!("<h3>{rest}</h3>"),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some(start) = rest.find("**") else {
            out.push_str(rest);
            break;
        };
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                out.push_str(&rest[..start]);
                out.push_str("<strong>");
                out.push_str(&after[..end]);
                out.push_str("</strong>");
                rest = &after[end + 2..];
            }
            _ => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

fn convert_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some(start) = rest.find('[') else {
            out.push_str(rest);
            break;
        };
        let candidate = &rest[start..];
        let parsed = candidate.find("](").and_then(|mid| {
            let after = &candidate[mid + 2..];
            after
                .find(')')
                .map(|close| (&candidate[1..mid], &after[..close], mid + 2 + close + 1))
        });
        match parsed {
            Some((label, url, consumed)) => {
                out.push_str(&rest[..start]);
                out.push_str(&format!("<a href=\"{url}\" target=\"_blank\">{label}</a>"));
                rest = &candidate[consumed..];
            }
            None => {
                out.push_str(&rest[..start + 1]);
                rest = &candidate[1..];
            }
        }
    }
    out
}

/// Writes the rendered report under `dir`, named by ISO week and date.
///
/// The content goes to a temp file first and is renamed into place, so
/// an interrupt never leaves a partial report behind.
pub async fn write_report(
    dir: &str,
    format: OutputFormat,
    content: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create output directory: {dir}"))?;

    let path = Path::new(dir).join(report_filename(format, now));
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("failed to write report: {}", tmp.display()))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .with_context(|| format!("failed to finalize report: {}", path.display()))?;
    Ok(path)
}

pub fn report_filename(format: OutputFormat, now: DateTime<Utc>) -> String {
    let ext = match format {
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };
    format!(
        "week_{}_{}.{ext}",
        now.iso_week().week(),
        now.format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn sample_data() -> ReportData {
        let mut buckets = BTreeMap::new();
        let mut summaries = BTreeMap::new();
        for category in Category::ALL {
            buckets.insert(category, Vec::new());
        }
        buckets.insert(
            Category::Industry,
            vec![ContentItem {
                title: "Model release".to_string(),
                link: "https://example.com/release".to_string(),
                raw_summary: "raw".to_string(),
                published: Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap(),
                source: "Example Blog".to_string(),
                category: Category::Industry,
                ai_summary: Some("A model was released.".to_string()),
            }],
        );
        summaries.insert(
            Category::Industry,
            "- **Release**: a model shipped. [link](https://example.com/release)".to_string(),
        );
        ReportData {
            buckets,
            summaries,
            insights: "1. **Trend**: models keep shipping.".to_string(),
        }
    }

    #[test]
    fn markdown_report_lists_counts_and_items() {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 0).unwrap();
        let md = render_markdown(&sample_data(), now);

        assert!(md.contains("Tracked **1** notable updates"));
        assert!(md.contains("- Industry News: 1 items"));
        assert!(md.contains("[Model release](https://example.com/release)"));
        assert!(md.contains("## Insights"));
        assert!(md.contains("No updates") || md.contains(NO_CONTENT));
    }

    #[test]
    fn html_report_renders_item_rows() {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 0).unwrap();
        let html = render_html(&sample_data(), now);

        assert!(html.contains("<a href=\"https://example.com/release\" target=\"_blank\">Model release</a>"));
        assert!(html.contains("A model was released."));
        assert!(html.contains("Example Blog"));
        // Empty categories render the no-data marker.
        assert!(html.contains("no-data"));
    }

    #[test]
    fn markdown_to_html_applies_rules_in_order() {
        let input = "### Weekly\n**Big** news with a [link](https://example.com).\n\nNext paragraph.";
        let html = markdown_to_html(input);
        assert_eq!(
            html,
            "<h3>Weekly</h3><br><strong>Big</strong> news with a \
             <a href=\"https://example.com\" target=\"_blank\">link</a>.<br><br>Next paragraph."
        );
    }

    #[test]
    fn markdown_to_html_leaves_unterminated_markers_alone() {
        assert_eq!(markdown_to_html("a ** b"), "a ** b");
        assert_eq!(markdown_to_html("stray [bracket"), "stray [bracket");
        assert_eq!(markdown_to_html("[no](close"), "[no](close");
    }

    #[test]
    fn report_filename_uses_week_and_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 0).unwrap();
        assert_eq!(
            report_filename(OutputFormat::Markdown, now),
            "week_24_20250612.md"
        );
        assert_eq!(
            report_filename(OutputFormat::Html, now),
            "week_24_20250612.html"
        );
    }

    #[tokio::test]
    async fn write_report_creates_the_file_atomically() {
        let dir = std::env::temp_dir().join(format!("llmpulse_report_test_{}", std::process::id()));
        let dir_str = dir.to_string_lossy().to_string();
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 0).unwrap();

        let path = write_report(&dir_str, OutputFormat::Markdown, "# report", now)
            .await
            .expect("write report");
        assert!(path.ends_with("week_24_20250612.md"));
        let content = tokio::fs::read_to_string(&path).await.expect("read back");
        assert_eq!(content, "# report");
        assert!(!path.with_extension("tmp").exists());
    }
}
