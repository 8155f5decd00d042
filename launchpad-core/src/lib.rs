//! Sitemap and robots generation for the Launchpad startup directory.
//!
//! Rows fetched by the caller flow through the page collectors in
//! [`collect`], are merged by [`render::Manifest`] and rendered into
//! `sitemap.xml` and `robots.txt` content.

pub mod collect;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;

pub use collect::{Collected, DropReason, DroppedRow, EntityOptions, ResourceKind};
pub use config::{BaseUrl, SiteConfig, StaticPage};
pub use error::ConfigError;
pub use model::{
    CategoryRow, ChangeFrequency, EntityRow, Entry, Moderated, PostRow, SiteRows, SourceTable,
    StartupRow,
};
pub use pipeline::{BuildOptions, BuildReport, SourceFilter, build_manifest};
pub use render::{Manifest, ManifestFormat, ManifestStats};
