// Sitemap entries and the source rows they are built from

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Advisory crawl frequency, as defined by the sitemaps.org protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

impl FromStr for ChangeFrequency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(ChangeFrequency::Always),
            "hourly" => Ok(ChangeFrequency::Hourly),
            "daily" => Ok(ChangeFrequency::Daily),
            "weekly" => Ok(ChangeFrequency::Weekly),
            "monthly" => Ok(ChangeFrequency::Monthly),
            "yearly" => Ok(ChangeFrequency::Yearly),
            "never" => Ok(ChangeFrequency::Never),
            _ => Err(ConfigError::UnknownValue {
                kind: "change frequency",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One crawlable URL with its optional metadata.
///
/// Entries are value objects: the `with_*` methods consume the entry and
/// return a new one rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_frequency: Option<ChangeFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

impl Entry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            last_modified: None,
            change_frequency: None,
            priority: None,
        }
    }

    pub fn with_last_modified(self, last_modified: impl Into<String>) -> Self {
        Self {
            last_modified: Some(last_modified.into()),
            ..self
        }
    }

    pub fn with_change_frequency(self, change_frequency: ChangeFrequency) -> Self {
        Self {
            change_frequency: Some(change_frequency),
            ..self
        }
    }

    pub fn with_priority(self, priority: f64) -> Self {
        Self {
            priority: Some(priority),
            ..self
        }
    }

    /// An entry without a URL is never emitted.
    pub fn is_rejected(&self) -> bool {
        self.url.trim().is_empty()
    }
}

/// Backend tables the manifest draws rows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTable {
    Categories,
    Startups,
    Posts,
}

impl SourceTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTable::Categories => "categories",
            SourceTable::Startups => "startups",
            SourceTable::Posts => "posts",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields the entity collector reads from a startup or post row.
pub trait EntityRow {
    fn id(&self) -> Option<&str>;
    fn slug(&self) -> Option<&str>;
    fn updated_at(&self) -> Option<&str>;
    fn created_at(&self) -> Option<&str>;
}

/// Rows that carry a moderation status.
pub trait Moderated {
    fn status(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartupRow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

impl StartupRow {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

impl PostRow {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

impl CategoryRow {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: Some(slug.to_string()),
        }
    }
}

/// Empty strings from the backend count as missing.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl EntityRow for StartupRow {
    fn id(&self) -> Option<&str> {
        present(&self.id)
    }
    fn slug(&self) -> Option<&str> {
        present(&self.slug)
    }
    fn updated_at(&self) -> Option<&str> {
        present(&self.updated_at)
    }
    fn created_at(&self) -> Option<&str> {
        present(&self.created_at)
    }
}

impl Moderated for StartupRow {
    fn status(&self) -> Option<&str> {
        present(&self.status)
    }
}

impl EntityRow for PostRow {
    fn id(&self) -> Option<&str> {
        present(&self.id)
    }
    fn slug(&self) -> Option<&str> {
        present(&self.slug)
    }
    fn updated_at(&self) -> Option<&str> {
        present(&self.updated_at)
    }
    fn created_at(&self) -> Option<&str> {
        present(&self.created_at)
    }
}

impl CategoryRow {
    pub fn slug(&self) -> Option<&str> {
        present(&self.slug)
    }
}

/// All rows fetched for one manifest build.
///
/// Also the shape of a JSON snapshot: `{"categories": [], "startups": [], "posts": []}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteRows {
    #[serde(default)]
    pub categories: Vec<CategoryRow>,
    #[serde(default)]
    pub startups: Vec<StartupRow>,
    #[serde(default)]
    pub posts: Vec<PostRow>,
}

impl SiteRows {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.startups.is_empty() && self.posts.is_empty()
    }
}

// Backends hand out integer ids for some tables and uuids for others
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    }))
}
