//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source site layout
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Language and size filter rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Feed and state file locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Channel metadata for a freshly created feed
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration, or return defaults if the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("No config at {}. Using defaults.", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.site.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::validation("site.base_url must be http(s)"));
        }
        if self.site.topic_marker.is_empty() {
            return Err(AppError::validation("site.topic_marker is empty"));
        }
        for pattern in &self.site.title_remove_patterns {
            Regex::new(pattern)?;
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_topics == 0 {
            return Err(AppError::validation("crawler.max_topics must be > 0"));
        }
        if self.crawler.max_new_entries == 0 {
            return Err(AppError::validation("crawler.max_new_entries must be > 0"));
        }
        for (name, value) in [
            ("filter.movie_max_gb", self.filter.movie_max_gb),
            ("filter.series_min_gb", self.filter.series_min_gb),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::validation(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        if self.filter.telugu_markers.is_empty() && self.filter.english_markers.is_empty() {
            return Err(AppError::validation("No language markers defined"));
        }
        if self.output.max_tracked_topics == 0 {
            return Err(AppError::validation(
                "output.max_tracked_topics must be > 0",
            ));
        }
        Ok(())
    }
}

/// Source site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Landing page that lists recent topics
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Substring identifying topic links on the landing page
    #[serde(default = "defaults::topic_marker")]
    pub topic_marker: String,

    /// Regex patterns removed from topic titles (site branding)
    #[serde(default = "defaults::title_remove_patterns")]
    pub title_remove_patterns: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            topic_marker: defaults::topic_marker(),
            title_remove_patterns: defaults::title_remove_patterns(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay before each topic request in seconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_secs: u64,

    /// Maximum topics scanned per run
    #[serde(default = "defaults::max_topics")]
    pub max_topics: usize,

    /// Maximum new feed entries emitted per run
    #[serde(default = "defaults::max_new_entries")]
    pub max_new_entries: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_secs: defaults::request_delay(),
            max_topics: defaults::max_topics(),
            max_new_entries: defaults::max_new_entries(),
        }
    }
}

/// Where the size of a magnet is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSource {
    /// Every magnet on a page shares the size parsed from the topic title
    #[default]
    Title,
    /// Use the magnet's exact length (`xl`) when present, else the title size
    MagnetThenTitle,
}

/// Language gate and size rule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Movies larger than this are rejected
    #[serde(default = "defaults::movie_max_gb")]
    pub movie_max_gb: f64,

    /// Series smaller than this are rejected
    #[serde(default = "defaults::series_min_gb")]
    pub series_min_gb: f64,

    #[serde(default)]
    pub size_source: SizeSource,

    /// Title substrings that mark a series
    #[serde(default = "defaults::series_keywords")]
    pub series_keywords: Vec<String>,

    #[serde(default = "defaults::telugu_markers")]
    pub telugu_markers: Vec<String>,

    #[serde(default = "defaults::english_markers")]
    pub english_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            movie_max_gb: defaults::movie_max_gb(),
            series_min_gb: defaults::series_min_gb(),
            size_source: SizeSource::default(),
            series_keywords: defaults::series_keywords(),
            telugu_markers: defaults::telugu_markers(),
            english_markers: defaults::english_markers(),
        }
    }
}

/// When the feed's `lastBuildDate` is refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildDatePolicy {
    /// Only when entries were added; unchanged runs leave the file untouched
    #[default]
    OnChange,
    /// Every run, rewriting the feed file each time
    Always,
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::feed_path")]
    pub feed_path: PathBuf,

    #[serde(default = "defaults::state_path")]
    pub state_path: PathBuf,

    #[serde(default)]
    pub build_date_policy: BuildDatePolicy,

    /// Retention bound for per-topic visit records
    #[serde(default = "defaults::max_tracked_topics")]
    pub max_tracked_topics: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            feed_path: defaults::feed_path(),
            state_path: defaults::state_path(),
            build_date_policy: BuildDatePolicy::default(),
            max_tracked_topics: defaults::max_tracked_topics(),
        }
    }
}

/// Channel metadata written into a new feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "defaults::channel_title")]
    pub title: String,

    #[serde(default = "defaults::base_url")]
    pub link: String,

    #[serde(default = "defaults::channel_description")]
    pub description: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: defaults::channel_title(),
            link: defaults::base_url(),
            description: defaults::channel_description(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://www.1tamilmv.rsvp/".into()
    }
    pub fn topic_marker() -> String {
        "/topic/".into()
    }
    pub fn title_remove_patterns() -> Vec<String> {
        strings(&[r"(?i)^\s*1TamilMV(\.\w+)?\s*[-|:]\s*"])
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        2
    }
    pub fn max_topics() -> usize {
        120
    }
    pub fn max_new_entries() -> usize {
        25
    }

    // Filter defaults
    pub fn movie_max_gb() -> f64 {
        4.0
    }
    pub fn series_min_gb() -> f64 {
        4.0
    }
    pub fn series_keywords() -> Vec<String> {
        strings(&[
            "season",
            "s01",
            "s02",
            "s03",
            "episode",
            "ep",
            "series",
            "web series",
        ])
    }
    pub fn telugu_markers() -> Vec<String> {
        strings(&["telugu", "+ tel", "[tel", " tel]", "tel +"])
    }
    pub fn english_markers() -> Vec<String> {
        strings(&["english", "+ eng", "[eng", " eng]", "eng +"])
    }

    // Output defaults
    pub fn feed_path() -> PathBuf {
        PathBuf::from("tamilmv.xml")
    }
    pub fn state_path() -> PathBuf {
        PathBuf::from("state.json")
    }
    pub fn max_tracked_topics() -> usize {
        2000
    }

    // Channel defaults
    pub fn channel_title() -> String {
        "1TamilMV Torrent RSS".into()
    }
    pub fn channel_description() -> String {
        "Auto RSS - No Miss - Smart Size Filter".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_emission_cap() {
        let mut config = Config::default();
        config.crawler.max_new_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_title_pattern() {
        let mut config = Config::default();
        config.site.title_remove_patterns = vec!["([unclosed".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_base() {
        let mut config = Config::default();
        config.site.base_url = "ftp://example.com/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max_new_entries = 5

            [filter]
            size_source = "magnet_then_title"

            [output]
            build_date_policy = "always"
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_new_entries, 5);
        assert_eq!(config.crawler.max_topics, 120);
        assert_eq!(config.filter.size_source, SizeSource::MagnetThenTitle);
        assert_eq!(config.output.build_date_policy, BuildDatePolicy::Always);
        assert_eq!(config.filter.movie_max_gb, 4.0);
        assert_eq!(config.site.topic_marker, "/topic/");
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("/definitely/not/here.toml").unwrap();
        assert_eq!(config.crawler.max_topics, 120);
    }

    #[test]
    fn load_or_default_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[output]\nstate_path = \"/srv/feeds/state.json\"\nmax_tracked_topics = \"lots\"\n",
        )
        .unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn load_reads_configured_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nstate_path = \"/srv/feeds/state.json\"\n").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.output.state_path, PathBuf::from("/srv/feeds/state.json"));
        assert_eq!(config.output.feed_path, PathBuf::from("tamilmv.xml"));
    }
}
