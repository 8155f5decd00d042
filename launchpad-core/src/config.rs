// Site configuration: base URL, crawl directives and the static page table

use crate::error::{ConfigError, Result};
use crate::model::ChangeFrequency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

pub const DEFAULT_SITEMAP_PATH: &str = "/sitemap.xml";
pub const DEFAULT_CATEGORY_PRIORITY: f64 = 0.8;
pub const DEFAULT_STARTUP_PRIORITY: f64 = 0.8;
pub const DEFAULT_POST_PRIORITY: f64 = 0.7;

/// Absolute site origin every manifest URL is built on.
///
/// Only http(s) URLs with a host and no query or fragment are accepted.
/// The string form never carries a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUrl {
    url: Url,
    root: String,
}

impl BaseUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("a host is required"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query strings and fragments are not allowed"));
        }

        let root = url.as_str().trim_end_matches('/').to_string();
        Ok(Self { url, root })
    }

    pub fn as_str(&self) -> &str {
        &self.root
    }

    /// URL of a static page path such as `/about`. `/` yields the site root with its slash.
    pub fn page(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.root, path)
        } else {
            format!("{}/{}", self.root, path)
        }
    }

    /// URL built from path segments, each percent-encoded as a single segment.
    /// `.` and `..` are still dot segments; see [`crate::collect::is_linkable`].
    pub fn resource(&self, segments: &[&str]) -> String {
        let mut url = self.url.clone();
        // http(s) URLs always have a base, so path_segments_mut cannot fail here
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self> {
        BaseUrl::parse(&value)
    }
}

impl From<BaseUrl> for String {
    fn from(value: BaseUrl) -> Self {
        value.root
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.root)
    }
}

/// One hand-maintained top-level page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    pub path: String,
    pub change_frequency: ChangeFrequency,
    pub priority: f64,
}

impl StaticPage {
    pub fn new(path: &str, change_frequency: ChangeFrequency, priority: f64) -> Self {
        Self {
            path: path.to_string(),
            change_frequency,
            priority,
        }
    }
}

/// The default top-level pages, most important first.
pub fn default_static_pages() -> Vec<StaticPage> {
    use ChangeFrequency::*;

    vec![
        StaticPage::new("/", Daily, 1.0),
        StaticPage::new("/explore", Daily, 0.9),
        StaticPage::new("/blog", Daily, 0.8),
        StaticPage::new("/about", Monthly, 0.6),
        StaticPage::new("/contact", Monthly, 0.5),
        StaticPage::new("/auth/login", Monthly, 0.4),
        StaticPage::new("/auth/signup", Monthly, 0.4),
        StaticPage::new("/privacy", Yearly, 0.3),
        StaticPage::new("/terms", Yearly, 0.3),
        StaticPage::new("/cookies", Yearly, 0.3),
    ]
}

pub fn default_disallow_paths() -> Vec<String> {
    vec![
        "/admin".to_string(),
        "/api".to_string(),
        "/auth/callback".to_string(),
    ]
}

fn default_sitemap_path() -> String {
    DEFAULT_SITEMAP_PATH.to_string()
}

fn default_category_priority() -> f64 {
    DEFAULT_CATEGORY_PRIORITY
}

fn default_startup_priority() -> f64 {
    DEFAULT_STARTUP_PRIORITY
}

fn default_post_priority() -> f64 {
    DEFAULT_POST_PRIORITY
}

/// Everything the manifest needs from its caller besides the fetched rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub base_url: BaseUrl,
    #[serde(default = "default_disallow_paths")]
    pub disallow_paths: Vec<String>,
    #[serde(default = "default_static_pages")]
    pub static_pages: Vec<StaticPage>,
    #[serde(default = "default_sitemap_path")]
    pub sitemap_path: String,
    #[serde(default = "default_category_priority")]
    pub category_priority: f64,
    #[serde(default = "default_startup_priority")]
    pub startup_priority: f64,
    #[serde(default = "default_post_priority")]
    pub post_priority: f64,
}

impl SiteConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: BaseUrl::parse(base_url)?,
            disallow_paths: default_disallow_paths(),
            static_pages: default_static_pages(),
            sitemap_path: default_sitemap_path(),
            category_priority: DEFAULT_CATEGORY_PRIORITY,
            startup_priority: DEFAULT_STARTUP_PRIORITY,
            post_priority: DEFAULT_POST_PRIORITY,
        })
    }

    pub fn with_static_pages(mut self, pages: Vec<StaticPage>) -> Self {
        self.static_pages = pages;
        self
    }

    pub fn with_disallow_paths(mut self, paths: Vec<String>) -> Self {
        self.disallow_paths = paths;
        self
    }

    pub fn sitemap_url(&self) -> String {
        self.base_url.page(&self.sitemap_path)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for page in &self.static_pages {
            if !page.path.starts_with('/') {
                return Err(ConfigError::InvalidPagePath(page.path.clone()));
            }
        }
        if !self.sitemap_path.starts_with('/') {
            return Err(ConfigError::InvalidPagePath(self.sitemap_path.clone()));
        }
        Ok(())
    }
}
