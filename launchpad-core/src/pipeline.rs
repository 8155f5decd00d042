// Runs the collectors over fetched rows and merges them into a manifest

use crate::collect::{
    Collected, DropReason, DroppedRow, EntityOptions, approved_only, collect_categories,
    collect_entities, collect_positioned, collect_static,
};
use crate::config::SiteConfig;
use crate::model::{SiteRows, SourceTable};
use crate::render::Manifest;
use tracing::{debug, info, warn};

/// How startup rows reached the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFilter {
    /// Served sitemap: only approved startups are listed
    #[default]
    ApprovedOnly,
    /// Offline generation: the caller already chose the rows
    PreFiltered,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub filter: SourceFilter,
    /// Build-time lastmod stamped on static pages
    pub static_stamp: Option<String>,
}

/// Per-collector entry counts before de-duplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorCounts {
    pub static_pages: usize,
    pub categories: usize,
    pub startups: usize,
    pub posts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub counts: CollectorCounts,
    pub dropped: Vec<DroppedRow>,
}

impl BuildReport {
    pub fn dropped_count(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

/// Collects static pages, categories, startups and posts, in that order,
/// and merges them into one manifest.
pub fn build_manifest(config: &SiteConfig, rows: &SiteRows, options: &BuildOptions) -> BuildReport {
    let base = &config.base_url;
    let mut dropped = Vec::new();

    let static_pages = collect_static(base, &config.static_pages, options.static_stamp.as_deref());
    let categories = collect_categories(base, &rows.categories, config.category_priority);

    let startup_options = EntityOptions::startups(config.startup_priority);
    let startups = match options.filter {
        SourceFilter::ApprovedOnly => {
            let (approved, unapproved) = approved_only(&rows.startups, SourceTable::Startups);
            dropped.extend(unapproved);
            collect_positioned(base, approved, &startup_options)
        }
        SourceFilter::PreFiltered => collect_entities(base, &rows.startups, &startup_options),
    };

    let posts = collect_entities(base, &rows.posts, &EntityOptions::posts(config.post_priority));

    let counts = CollectorCounts {
        static_pages: static_pages.len(),
        categories: categories.len(),
        startups: startups.len(),
        posts: posts.len(),
    };

    let sequences: Vec<Collected> = vec![static_pages, categories, startups, posts];
    let mut entry_sequences = Vec::with_capacity(sequences.len());
    for collected in sequences {
        dropped.extend(collected.dropped);
        entry_sequences.push(collected.entries);
    }

    for row in &dropped {
        match row.reason {
            DropReason::MissingIdentifier => warn!(
                "Skipping {} row #{}: {}",
                row.table,
                row.position,
                row.reason.as_str()
            ),
            DropReason::NotApproved => debug!(
                "Skipping {} row #{}: {}",
                row.table,
                row.position,
                row.reason.as_str()
            ),
        }
    }

    let manifest = Manifest::merge(entry_sequences);
    let stats = manifest.stats();
    info!(
        "Built manifest: {} entries ({} duplicates, {} rejected, {} rows dropped)",
        stats.emitted,
        stats.duplicates,
        stats.rejected,
        dropped.len()
    );

    BuildReport {
        manifest,
        counts,
        dropped,
    }
}
