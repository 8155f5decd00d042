// Page collectors: pure transforms from source rows to sitemap entries

use crate::config::{BaseUrl, StaticPage};
use crate::model::{CategoryRow, ChangeFrequency, EntityRow, Entry, Moderated, SourceTable};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

pub const APPROVED_STATUS: &str = "approved";

// Postgres renders `timestamptz` with a space and `+HH` offsets, and
// `timestamp` with no offset at all
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Kind of per-entity page, which decides the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Startup,
    Post,
}

impl ResourceKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceKind::Startup => "startup",
            ResourceKind::Post => "blog",
        }
    }

    pub fn table(&self) -> SourceTable {
        match self {
            ResourceKind::Startup => SourceTable::Startups,
            ResourceKind::Post => SourceTable::Posts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Neither a slug nor an id usable as a URL segment
    MissingIdentifier,
    /// Startup not yet approved for public listing
    NotApproved,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::MissingIdentifier => "missing slug and id",
            DropReason::NotApproved => "not approved",
        }
    }
}

/// A source row that produced no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub table: SourceTable,
    /// Zero-based position of the row in the collector's input
    pub position: usize,
    pub reason: DropReason,
}

/// Output of one collection pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub entries: Vec<Entry>,
    pub dropped: Vec<DroppedRow>,
}

impl Collected {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which row field supplied an entity's URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSource {
    Slug,
    Id,
}

/// Which row field supplied an entity's last-modified time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    UpdatedAt,
    CreatedAt,
}

/// Whether a slug or id can stand as one path segment. `.` and `..` are
/// dot segments to the URL parser, even percent-encoded, and would resolve
/// to the parent page.
pub fn is_linkable(segment: &str) -> bool {
    segment != "." && segment != ".."
}

/// Identifier rule: slug first, then id. `None` means the row cannot be linked.
pub fn resolve_identifier<R: EntityRow + ?Sized>(row: &R) -> Option<(&str, IdentifierSource)> {
    row.slug()
        .filter(|slug| is_linkable(slug))
        .map(|slug| (slug, IdentifierSource::Slug))
        .or_else(|| {
            row.id()
                .filter(|id| is_linkable(id))
                .map(|id| (id, IdentifierSource::Id))
        })
}

/// Last-modified rule: updated_at first, then created_at.
///
/// A value [`normalize_timestamp`] cannot read is skipped as if absent, so a
/// garbled `updated_at` still falls back to `created_at`.
pub fn resolve_last_modified<R: EntityRow + ?Sized>(
    row: &R,
) -> Option<(String, TimestampSource)> {
    row.updated_at()
        .and_then(normalize_timestamp)
        .map(|ts| (ts, TimestampSource::UpdatedAt))
        .or_else(|| {
            row.created_at()
                .and_then(normalize_timestamp)
                .map(|ts| (ts, TimestampSource::CreatedAt))
        })
}

/// W3C datetime for a backend timestamp, or `None` if it does not parse.
///
/// RFC 3339 values and plain `YYYY-MM-DD` dates pass through unchanged.
/// Other ISO 8601 shapes are rewritten in UTC to the second; a value without
/// an offset is read as UTC.
pub fn normalize_timestamp(value: &str) -> Option<String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        if value.as_bytes().get(10) == Some(&b'T') {
            return Some(value.to_string());
        }
        return Some(to_w3c(ts.with_timezone(&Utc)));
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Some(value.to_string());
    }

    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(to_w3c(ts.with_timezone(&Utc)));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|ts| to_w3c(ts.and_utc()))
}

fn to_w3c(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn is_valid_timestamp(value: &str) -> bool {
    normalize_timestamp(value).is_some()
}

/// Entries for the configured static page table, in table order.
///
/// `stamp` is an optional build-time lastmod applied to every page; the
/// collector never reads the clock itself.
pub fn collect_static(base: &BaseUrl, pages: &[StaticPage], stamp: Option<&str>) -> Collected {
    let entries = pages
        .iter()
        .map(|page| {
            let entry = Entry::new(base.page(&page.path))
                .with_change_frequency(page.change_frequency)
                .with_priority(page.priority);
            match stamp {
                Some(ts) => entry.with_last_modified(ts),
                None => entry,
            }
        })
        .collect();

    Collected {
        entries,
        dropped: Vec::new(),
    }
}

/// One `/explore/{slug}` entry per category, in input order.
pub fn collect_categories(base: &BaseUrl, rows: &[CategoryRow], priority: f64) -> Collected {
    let mut collected = Collected::default();

    for (position, row) in rows.iter().enumerate() {
        match row.slug().filter(|slug| is_linkable(slug)) {
            Some(slug) => collected.entries.push(
                Entry::new(base.resource(&["explore", slug]))
                    .with_change_frequency(ChangeFrequency::Weekly)
                    .with_priority(priority),
            ),
            None => collected.dropped.push(DroppedRow {
                table: SourceTable::Categories,
                position,
                reason: DropReason::MissingIdentifier,
            }),
        }
    }

    collected
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityOptions {
    pub kind: ResourceKind,
    pub change_frequency: ChangeFrequency,
    pub priority: f64,
}

impl EntityOptions {
    pub fn startups(priority: f64) -> Self {
        Self {
            kind: ResourceKind::Startup,
            change_frequency: ChangeFrequency::Weekly,
            priority,
        }
    }

    pub fn posts(priority: f64) -> Self {
        Self {
            kind: ResourceKind::Post,
            change_frequency: ChangeFrequency::Weekly,
            priority,
        }
    }
}

/// One `/{kind}/{slug-or-id}` entry per row.
///
/// Rows degrade field by field; only a row with neither slug nor id is dropped.
pub fn collect_entities<R: EntityRow>(base: &BaseUrl, rows: &[R], options: &EntityOptions) -> Collected {
    collect_positioned(base, rows.iter().enumerate(), options)
}

/// Same as [`collect_entities`] over a subset of the input, such as the output
/// of [`approved_only`]. Dropped rows keep the position given with each row.
pub fn collect_positioned<'a, R, I>(base: &BaseUrl, rows: I, options: &EntityOptions) -> Collected
where
    R: EntityRow + 'a,
    I: IntoIterator<Item = (usize, &'a R)>,
{
    let mut collected = Collected::default();

    for (position, row) in rows {
        let Some((identifier, _)) = resolve_identifier(row) else {
            collected.dropped.push(DroppedRow {
                table: options.kind.table(),
                position,
                reason: DropReason::MissingIdentifier,
            });
            continue;
        };

        let entry = Entry::new(base.resource(&[options.kind.path_segment(), identifier]))
            .with_change_frequency(options.change_frequency)
            .with_priority(options.priority);

        collected.entries.push(match resolve_last_modified(row) {
            Some((ts, _)) => entry.with_last_modified(ts),
            None => entry,
        });
    }

    collected
}

/// Splits out the rows eligible for the public sitemap, each paired with its
/// position in `rows`.
pub fn approved_only<R: Moderated>(
    rows: &[R],
    table: SourceTable,
) -> (Vec<(usize, &R)>, Vec<DroppedRow>) {
    let mut approved = Vec::new();
    let mut dropped = Vec::new();

    for (position, row) in rows.iter().enumerate() {
        if row.status() == Some(APPROVED_STATUS) {
            approved.push((position, row));
        } else {
            dropped.push(DroppedRow {
                table,
                position,
                reason: DropReason::NotApproved,
            });
        }
    }

    (approved, dropped)
}
