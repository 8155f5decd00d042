use crate::error::Result;
use launchpad_core::SiteRows;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads a JSON document shaped like `{"categories": [], "startups": [], "posts": []}`.
pub fn load_snapshot_json(path: &Path) -> Result<SiteRows> {
    let content = fs::read_to_string(path)?;
    let rows: SiteRows = serde_json::from_str(&content)?;
    debug!(
        "Loaded snapshot {}: {} categories, {} startups, {} posts",
        path.display(),
        rows.categories.len(),
        rows.startups.len(),
        rows.posts.len()
    );
    Ok(rows)
}

pub fn save_snapshot_json(rows: &SiteRows, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(path, json)?;
    Ok(())
}
