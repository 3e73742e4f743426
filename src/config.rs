//! TOML configuration.
//!
//! ```toml
//! [content]
//! root = "./content/blog"
//! layout = "folders"        # or "flat"
//! page_size = 10
//!
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [site]
//! url = "https://buildinghealthx.com"
//!
//! [reviews]
//! window_secs = 900
//! max_submissions = 3
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bhx_content_core::paginate::DEFAULT_PAGE_SIZE;
use bhx_content_core::ratelimit::{DEFAULT_MAX, DEFAULT_WINDOW};

/// Longest accepted review window (30 days).
const MAX_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub content: ContentConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub reviews: ReviewsConfig,
}

/// How posts are laid out under the content root.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One folder per post holding `index.mdx` or `index.md` with frontmatter.
    #[default]
    Folders,
    /// Loose files anywhere under the root, titled by file name.
    Flat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub layout: Layout,
    /// Candidate file names inside a post folder, first match wins.
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// Globs selecting files for the flat layout, relative to the root.
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    /// Use the file's modification time when a post has no `date` field.
    #[serde(default = "default_true")]
    pub mtime_fallback: bool,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_index_files() -> Vec<String> {
    vec!["index.mdx".to_string(), "index.md".to_string()]
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.txt".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_site_url")]
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
        }
    }
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReviewsConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_submissions: default_max_submissions(),
        }
    }
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW.as_secs()
}
fn default_max_submissions() -> u32 {
    DEFAULT_MAX
}

impl ReviewsConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl SiteConfig {
    /// Site URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl Config {
    /// Config pointing at `root` with every other setting defaulted.
    pub fn minimal(root: impl Into<PathBuf>) -> Self {
        Self {
            content: ContentConfig {
                root: root.into(),
                layout: Layout::default(),
                index_files: default_index_files(),
                include_globs: default_include_globs(),
                mtime_fallback: true,
                page_size: default_page_size(),
            },
            server: ServerConfig {
                bind: "127.0.0.1:3000".to_string(),
            },
            site: SiteConfig::default(),
            reviews: ReviewsConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.content.page_size == 0 {
        anyhow::bail!("content.page_size must be > 0");
    }
    if config.content.layout == Layout::Folders && config.content.index_files.is_empty() {
        anyhow::bail!("content.index_files must not be empty for the folders layout");
    }
    if config.content.layout == Layout::Flat && config.content.include_globs.is_empty() {
        anyhow::bail!("content.include_globs must not be empty for the flat layout");
    }
    if config.reviews.max_submissions == 0 {
        anyhow::bail!("reviews.max_submissions must be > 0");
    }
    if config.reviews.window_secs == 0 || config.reviews.window_secs > MAX_WINDOW_SECS {
        anyhow::bail!(
            "reviews.window_secs must be between 1 and {}",
            MAX_WINDOW_SECS
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[content]
root = "./content/blog"

[server]
bind = "127.0.0.1:3000"
"#,
        )
        .unwrap();
        assert_eq!(cfg.content.layout, Layout::Folders);
        assert_eq!(cfg.content.index_files, vec!["index.mdx", "index.md"]);
        assert_eq!(cfg.content.page_size, 10);
        assert!(cfg.content.mtime_fallback);
        assert_eq!(cfg.reviews.window(), Duration::from_secs(900));
        assert_eq!(cfg.reviews.max_submissions, 3);
        validate(&cfg).unwrap();
    }

    #[test]
    fn test_flat_layout_and_validation() {
        let mut cfg: Config = toml::from_str(
            r#"
[content]
root = "./content/blog_src"
layout = "flat"

[server]
bind = "127.0.0.1:3000"

[site]
url = "https://example.org/"

[reviews]
max_submissions = 0
"#,
        )
        .unwrap();
        assert_eq!(cfg.content.layout, Layout::Flat);
        assert_eq!(cfg.site.base_url(), "https://example.org");
        assert!(validate(&cfg).is_err());
        cfg.reviews.max_submissions = 5;
        validate(&cfg).unwrap();
    }

    #[test]
    fn test_window_bounds() {
        let mut cfg = Config::minimal("./content/blog");
        cfg.reviews.window_secs = u64::MAX;
        assert!(validate(&cfg).is_err());
        cfg.reviews.window_secs = 0;
        assert!(validate(&cfg).is_err());
        cfg.reviews.window_secs = MAX_WINDOW_SECS;
        validate(&cfg).unwrap();
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let parsed: Result<Config, _> = toml::from_str(
            r#"
[content]
root = "x"
layout = "database"

[server]
bind = "127.0.0.1:3000"
"#,
        );
        assert!(parsed.is_err());
    }
}
