/*!
common/src/lib.rs

Shared configuration types for LLMPulse.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader merging a default TOML config file with an override
- The fixed category set shared by the pipeline and the renderers
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The four fixed topic buckets used to partition all fetched content.
///
/// Declaration order is the processing order of the pipeline; `Ord`
/// follows it, so ordered maps keyed by `Category` iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Industry,
    Academic,
    Applications,
    Startups,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Industry,
        Category::Academic,
        Category::Applications,
        Category::Startups,
    ];

    /// Config/key form, as it appears in TOML.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Industry => "industry",
            Category::Academic => "academic",
            Category::Applications => "applications",
            Category::Startups => "startups",
        }
    }

    /// Human-readable section title used in prompts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Industry => "Industry News",
            Category::Academic => "Academic Frontier",
            Category::Applications => "Applications in Practice",
            Category::Startups => "Startup Ecosystem",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Static descriptor of one feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub category: Category,
}

/// Feed sources grouped per category, as laid out in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub industry: Vec<FeedSource>,
    #[serde(default)]
    pub academic: Vec<FeedSource>,
    #[serde(default)]
    pub applications: Vec<FeedSource>,
    #[serde(default)]
    pub startups: Vec<FeedSource>,
}

impl SourcesConfig {
    pub fn for_category(&self, category: Category) -> &[FeedSource] {
        match category {
            Category::Industry => &self.industry,
            Category::Academic => &self.academic,
            Category::Applications => &self.applications,
            Category::Startups => &self.startups,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
}

/// Report shaping and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Cutoff window: items older than `now - days_back` are dropped
    #[serde(default = "default_days_back")]
    pub days_back: i64,
    #[serde(default = "default_max_items")]
    pub max_items_per_category: usize,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_true")]
    pub generate_insights: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            max_items_per_category: default_max_items(),
            output_format: OutputFormat::default(),
            output_dir: default_output_dir(),
            generate_insights: true,
        }
    }
}

/// LLM inference service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Inline API key; if absent the key is read from `api_key_env`
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            api_key_env: default_api_key_env(),
            api_url: default_api_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

/// Politeness / fetching configuration.
///
/// Delays are deliberate rate limiting toward third-party services.
/// Tests set them to zero; that changes timing only, never call semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Wait after each feed fetch
    #[serde(default = "default_feed_delay_ms")]
    pub feed_delay_ms: u64,
    /// Wait between successive per-item summarizations
    #[serde(default = "default_summary_delay_ms")]
    pub summary_delay_ms: u64,
    /// HTTP timeout for feed and article fetches
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            feed_delay_ms: default_feed_delay_ms(),
            summary_delay_ms: default_summary_delay_ms(),
            fetch_timeout_seconds: default_fetch_timeout(),
        }
    }
}

fn default_days_back() -> i64 {
    7
}
fn default_max_items() -> usize {
    10
}
fn default_output_dir() -> String {
    "reports".to_string()
}
fn default_true() -> bool {
    true
}
fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}
fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}
fn default_max_tokens() -> usize {
    4096
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_feed_delay_ms() -> u64 {
    500
}
fn default_summary_delay_ms() -> u64 {
    1000
}
fn default_fetch_timeout() -> u64 {
    10
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_string_with_defaults() {
        let toml = r#"
            [report]
            days_back = 3
            output_format = "html"

            [llm]
            model = "claude-test"

            [[sources.industry]]
            name = "OpenAI Blog"
            url = "https://openai.com/blog/rss.xml"
            category = "industry"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.report.days_back, 3);
        assert_eq!(cfg.report.max_items_per_category, 10);
        assert_eq!(cfg.report.output_format, OutputFormat::Html);
        assert!(cfg.report.generate_insights);
        assert_eq!(cfg.llm.model, "claude-test");
        assert_eq!(cfg.llm.provider, "anthropic");
        assert_eq!(cfg.pacing.feed_delay_ms, 500);
        assert_eq!(cfg.pacing.summary_delay_ms, 1000);
        assert_eq!(cfg.sources.industry.len(), 1);
        assert_eq!(cfg.sources.industry[0].category, Category::Industry);
        assert!(cfg.sources.academic.is_empty());
    }

    #[test]
    fn empty_config_is_valid() {
        let cfg: Config = toml::from_str("").expect("parse empty config");
        assert_eq!(cfg.report.days_back, 7);
        assert_eq!(cfg.report.output_format, OutputFormat::Markdown);
        assert_eq!(cfg.report.output_dir, "reports");
    }

    #[test]
    fn category_order_is_fixed() {
        let mut cats = vec![
            Category::Startups,
            Category::Academic,
            Category::Industry,
            Category::Applications,
        ];
        cats.sort();
        assert_eq!(cats, Category::ALL.to_vec());
        assert_eq!(Category::Startups.key(), "startups");
        assert_eq!(Category::Industry.to_string(), "industry");
    }

    #[tokio::test]
    async fn load_with_defaults_merges_override() {
        let dir = std::env::temp_dir().join(format!(
            "llmpulse_cfg_test_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");

        let default_path = dir.join("config.default.toml");
        let override_path = dir.join("config.toml");
        std::fs::write(
            &default_path,
            "[report]\ndays_back = 7\nmax_items_per_category = 10\n",
        )
        .expect("write default");
        std::fs::write(&override_path, "[report]\ndays_back = 14\n").expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load config");
        assert_eq!(cfg.report.days_back, 14);
        assert_eq!(cfg.report.max_items_per_category, 10);
    }
}
