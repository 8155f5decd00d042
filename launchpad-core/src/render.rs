// Manifest merging and document rendering

use crate::config::BaseUrl;
use crate::error::ConfigError;
use crate::model::Entry;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const SITEMAP_CONTENT_TYPE: &str = "application/xml";
pub const ROBOTS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestFormat {
    Xml,
    Json,
    Text,
}

impl FromStr for ManifestFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xml" => Ok(ManifestFormat::Xml),
            "json" => Ok(ManifestFormat::Json),
            "text" | "txt" => Ok(ManifestFormat::Text),
            _ => Err(ConfigError::UnknownValue {
                kind: "manifest format",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestStats {
    /// Entries handed to the merge, before any filtering
    pub supplied: usize,
    pub emitted: usize,
    pub duplicates: usize,
    /// Entries with an empty URL
    pub rejected: usize,
}

/// The ordered, de-duplicated set of entries a sitemap is rendered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: Vec<Entry>,
    stats: ManifestStats,
}

impl Manifest {
    /// Concatenates the sequences in the order given, keeping the first
    /// entry seen for each URL. URLs compare as exact strings.
    pub fn merge<I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = Vec<Entry>>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();
        let mut stats = ManifestStats::default();

        for entry in sequences.into_iter().flatten() {
            stats.supplied += 1;

            if entry.is_rejected() {
                stats.rejected += 1;
                debug!("Skipping entry with empty URL");
                continue;
            }
            if !seen.insert(entry.url.clone()) {
                stats.duplicates += 1;
                debug!("Dropping duplicate sitemap URL {}", entry.url);
                continue;
            }

            entries.push(entry);
        }

        stats.emitted = entries.len();
        Self { entries, stats }
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self::merge([entries])
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn stats(&self) -> ManifestStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render_sitemap(&self) -> String {
        generate_sitemap_xml(&self.entries)
    }
}

pub fn generate_sitemap_xml(entries: &[Entry]) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_XMLNS));

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(entry.url.as_str())));

        if let Some(ref last_modified) = entry.last_modified {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                escape(last_modified.as_str())
            ));
        }
        if let Some(change_frequency) = entry.change_frequency {
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", change_frequency));
        }
        if let Some(priority) = entry.priority.and_then(format_priority) {
            xml.push_str(&format!("    <priority>{}</priority>\n", priority));
        }

        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Robots directives: one wildcard stanza, the disallow paths verbatim and
/// in order, then the sitemap location.
pub fn generate_robots_txt(disallow_paths: &[String], sitemap_url: &str) -> String {
    let mut robots = String::from("User-agent: *\n");

    for path in disallow_paths {
        robots.push_str(&format!("Disallow: {}\n", path));
    }

    robots.push('\n');
    robots.push_str(&format!("Sitemap: {}\n", sitemap_url));
    robots
}

pub fn generate_json_manifest(
    manifest: &Manifest,
    base_url: &BaseUrl,
) -> Result<String, serde_json::Error> {
    let json = serde_json::json!({
        "manifest": {
            "metadata": {
                "generator": "Launchpad",
                "version": env!("CARGO_PKG_VERSION"),
                "base_url": base_url.as_str(),
                "format": "json"
            },
            "summary": manifest.stats(),
            "entries": manifest.entries(),
        }
    });

    serde_json::to_string_pretty(&json)
}

/// Human-readable listing, grouped under the site root.
pub fn generate_text_listing(manifest: &Manifest, base_url: &BaseUrl) -> String {
    let mut listing = format!("{}\n", base_url);

    if manifest.is_empty() {
        listing.push_str("  (empty)\n");
        return listing;
    }

    let entries = manifest.entries();
    for (i, entry) in entries.iter().enumerate() {
        let prefix = if i == entries.len() - 1 {
            "└── "
        } else {
            "├── "
        };

        let display = entry
            .url
            .strip_prefix(base_url.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or("/");

        let change_frequency = entry
            .change_frequency
            .map(|c| c.as_str())
            .unwrap_or("-");
        let priority = entry
            .priority
            .and_then(format_priority)
            .unwrap_or_else(|| "-".to_string());

        listing.push_str(&format!(
            "{}{}  [{} {}]",
            prefix, display, change_frequency, priority
        ));
        if let Some(ref last_modified) = entry.last_modified {
            listing.push_str(&format!(" {}", last_modified));
        }
        listing.push('\n');
    }

    listing
}

pub fn render_manifest(
    manifest: &Manifest,
    format: ManifestFormat,
    base_url: &BaseUrl,
) -> Result<String, serde_json::Error> {
    match format {
        ManifestFormat::Xml => Ok(manifest.render_sitemap()),
        ManifestFormat::Json => generate_json_manifest(manifest, base_url),
        ManifestFormat::Text => Ok(generate_text_listing(manifest, base_url)),
    }
}

pub fn save_document(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Clamps into [0.0, 1.0] and keeps at most two decimals, always at least one.
/// NaN has no meaningful rendering and is left out.
fn format_priority(priority: f64) -> Option<String> {
    if priority.is_nan() {
        return None;
    }

    let formatted = format!("{:.2}", priority.clamp(0.0, 1.0));
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        Some(format!("{}0", trimmed))
    } else {
        Some(trimmed.to_string())
    }
}
