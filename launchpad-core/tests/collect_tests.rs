// Tests for the page collectors

use launchpad_core::collect::{
    DropReason, EntityOptions, IdentifierSource, TimestampSource, approved_only,
    collect_categories, collect_entities, collect_positioned, collect_static, is_linkable,
    is_valid_timestamp, normalize_timestamp, resolve_identifier, resolve_last_modified,
};
use launchpad_core::config::{BaseUrl, StaticPage, default_static_pages};
use launchpad_core::model::{CategoryRow, ChangeFrequency, PostRow, SourceTable, StartupRow};

fn base() -> BaseUrl {
    BaseUrl::parse("https://launchpad.example").unwrap()
}

fn startup(id: Option<&str>, slug: Option<&str>, status: &str) -> StartupRow {
    StartupRow {
        id: id.map(String::from),
        slug: slug.map(String::from),
        status: Some(status.to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Static Collector Tests
// ============================================================================

#[test]
fn test_collect_static_default_table() {
    let collected = collect_static(&base(), &default_static_pages(), None);

    assert_eq!(collected.len(), 10);
    assert!(collected.dropped.is_empty());
    assert_eq!(collected.entries[0].url, "https://launchpad.example/");
    assert_eq!(collected.entries[0].priority, Some(1.0));
    assert_eq!(
        collected.entries[0].change_frequency,
        Some(ChangeFrequency::Daily)
    );
    assert_eq!(collected.entries[1].url, "https://launchpad.example/explore");
}

#[test]
fn test_collect_static_has_no_lastmod_without_stamp() {
    let collected = collect_static(&base(), &default_static_pages(), None);
    assert!(collected.entries.iter().all(|e| e.last_modified.is_none()));
}

#[test]
fn test_collect_static_applies_stamp() {
    let collected = collect_static(
        &base(),
        &default_static_pages(),
        Some("2024-06-01T12:00:00Z"),
    );
    assert!(
        collected
            .entries
            .iter()
            .all(|e| e.last_modified.as_deref() == Some("2024-06-01T12:00:00Z"))
    );
}

#[test]
fn test_collect_static_substitute_table() {
    let pages = vec![
        StaticPage::new("/", ChangeFrequency::Hourly, 1.0),
        StaticPage::new("/pricing", ChangeFrequency::Monthly, 0.5),
    ];
    let collected = collect_static(&base(), &pages, None);

    assert_eq!(collected.len(), 2);
    assert_eq!(collected.entries[1].url, "https://launchpad.example/pricing");
    assert_eq!(
        collected.entries[1].change_frequency,
        Some(ChangeFrequency::Monthly)
    );
}

#[test]
fn test_collect_static_empty_table() {
    let collected = collect_static(&base(), &[], None);
    assert!(collected.is_empty());
}

// ============================================================================
// Category Collector Tests
// ============================================================================

#[test]
fn test_collect_categories() {
    let rows = vec![CategoryRow::new("ai"), CategoryRow::new("fintech")];
    let collected = collect_categories(&base(), &rows, 0.8);

    assert_eq!(collected.len(), 2);
    assert_eq!(collected.entries[0].url, "https://launchpad.example/explore/ai");
    assert_eq!(
        collected.entries[1].url,
        "https://launchpad.example/explore/fintech"
    );
    assert_eq!(collected.entries[0].priority, Some(0.8));
    assert_eq!(
        collected.entries[0].change_frequency,
        Some(ChangeFrequency::Weekly)
    );
    assert!(collected.entries[0].last_modified.is_none());
}

#[test]
fn test_collect_categories_preserves_input_order() {
    let rows = vec![CategoryRow::new("zeta"), CategoryRow::new("alpha")];
    let collected = collect_categories(&base(), &rows, 0.8);

    assert!(collected.entries[0].url.ends_with("/zeta"));
    assert!(collected.entries[1].url.ends_with("/alpha"));
}

#[test]
fn test_collect_categories_drops_missing_slug() {
    let rows = vec![
        CategoryRow::new("ai"),
        CategoryRow { slug: None },
        CategoryRow::new("   "),
    ];
    let collected = collect_categories(&base(), &rows, 0.8);

    assert_eq!(collected.len(), 1);
    assert_eq!(collected.dropped.len(), 2);
    assert_eq!(collected.dropped[0].position, 1);
    assert_eq!(collected.dropped[0].table, SourceTable::Categories);
    assert_eq!(collected.dropped[1].reason, DropReason::MissingIdentifier);
}

#[test]
fn test_collect_categories_encodes_slug() {
    let rows = vec![CategoryRow::new("health care/bio")];
    let collected = collect_categories(&base(), &rows, 0.8);

    assert_eq!(
        collected.entries[0].url,
        "https://launchpad.example/explore/health%20care%2Fbio"
    );
}

// ============================================================================
// Fallback Rule Tests
// ============================================================================

#[test]
fn test_resolve_identifier_prefers_slug() {
    let row = startup(Some("s1"), Some("acme"), "approved");
    assert_eq!(
        resolve_identifier(&row),
        Some(("acme", IdentifierSource::Slug))
    );
}

#[test]
fn test_resolve_identifier_falls_back_to_id() {
    let row = startup(Some("s2"), None, "approved");
    assert_eq!(resolve_identifier(&row), Some(("s2", IdentifierSource::Id)));
}

#[test]
fn test_resolve_identifier_empty_slug_falls_back_to_id() {
    let row = startup(Some("s3"), Some(""), "approved");
    assert_eq!(resolve_identifier(&row), Some(("s3", IdentifierSource::Id)));
}

#[test]
fn test_resolve_identifier_dot_slug_falls_back_to_id() {
    let row = startup(Some("s4"), Some(".."), "approved");
    assert_eq!(resolve_identifier(&row), Some(("s4", IdentifierSource::Id)));

    let row = startup(Some("."), Some("."), "approved");
    assert_eq!(resolve_identifier(&row), None);
}

#[test]
fn test_is_linkable() {
    assert!(is_linkable("acme"));
    assert!(is_linkable("..."));
    assert!(is_linkable(".hidden"));
    assert!(!is_linkable("."));
    assert!(!is_linkable(".."));
}

#[test]
fn test_resolve_identifier_none() {
    let row = startup(None, None, "approved");
    assert_eq!(resolve_identifier(&row), None);
}

#[test]
fn test_resolve_last_modified_prefers_updated_at() {
    let row = PostRow {
        updated_at: Some("2024-02-01T00:00:00Z".to_string()),
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        ..PostRow::new("p1")
    };
    assert_eq!(
        resolve_last_modified(&row),
        Some(("2024-02-01T00:00:00Z".to_string(), TimestampSource::UpdatedAt))
    );
}

#[test]
fn test_resolve_last_modified_falls_back_to_created_at() {
    let row = PostRow {
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        ..PostRow::new("p1")
    };
    assert_eq!(
        resolve_last_modified(&row),
        Some(("2024-01-01T00:00:00Z".to_string(), TimestampSource::CreatedAt))
    );
}

#[test]
fn test_resolve_last_modified_skips_invalid_updated_at() {
    let row = PostRow {
        updated_at: Some("last tuesday".to_string()),
        created_at: Some("2024-01-01".to_string()),
        ..PostRow::new("p1")
    };
    assert_eq!(
        resolve_last_modified(&row),
        Some(("2024-01-01".to_string(), TimestampSource::CreatedAt))
    );
}

#[test]
fn test_resolve_last_modified_reads_timestamps_without_offset() {
    let row = PostRow {
        updated_at: Some("2024-01-01T00:00:00.123456".to_string()),
        created_at: Some("2023-06-01T00:00:00".to_string()),
        ..PostRow::new("p1")
    };
    assert_eq!(
        resolve_last_modified(&row),
        Some(("2024-01-01T00:00:00Z".to_string(), TimestampSource::UpdatedAt))
    );

    let row = PostRow {
        created_at: Some("2023-06-01T00:00:00".to_string()),
        ..PostRow::new("p1")
    };
    assert_eq!(
        resolve_last_modified(&row),
        Some(("2023-06-01T00:00:00Z".to_string(), TimestampSource::CreatedAt))
    );
}

#[test]
fn test_resolve_last_modified_reads_postgres_text_form() {
    let row = StartupRow {
        updated_at: Some("2024-01-01 00:00:00+00".to_string()),
        ..startup(Some("s1"), Some("acme"), "approved")
    };
    assert_eq!(
        resolve_last_modified(&row),
        Some(("2024-01-01T00:00:00Z".to_string(), TimestampSource::UpdatedAt))
    );
}

#[test]
fn test_normalize_timestamp() {
    // Already W3C: kept verbatim
    assert_eq!(
        normalize_timestamp("2024-01-01T00:00:00.5+02:00").as_deref(),
        Some("2024-01-01T00:00:00.5+02:00")
    );
    assert_eq!(normalize_timestamp("2024-01-01").as_deref(), Some("2024-01-01"));

    assert_eq!(
        normalize_timestamp("2024-01-01 12:30:00.123+05:30").as_deref(),
        Some("2024-01-01T07:00:00Z")
    );
    assert_eq!(
        normalize_timestamp("2024-01-01 12:30:00+00:00").as_deref(),
        Some("2024-01-01T12:30:00Z")
    );
    assert_eq!(
        normalize_timestamp("2024-01-01 12:30:00").as_deref(),
        Some("2024-01-01T12:30:00Z")
    );
    assert_eq!(normalize_timestamp("2024-01-01T25:00:00"), None);
    assert_eq!(normalize_timestamp("soon"), None);
}

#[test]
fn test_resolve_last_modified_none() {
    let row = PostRow::new("p1");
    assert_eq!(resolve_last_modified(&row), None);
}

#[test]
fn test_is_valid_timestamp() {
    assert!(is_valid_timestamp("2024-01-01T00:00:00Z"));
    assert!(is_valid_timestamp("2024-01-01T00:00:00.123456+00:00"));
    assert!(is_valid_timestamp("2024-01-01"));
    assert!(is_valid_timestamp("2024-01-01T00:00:00"));
    assert!(is_valid_timestamp("2024-01-01 00:00:00+00"));
    assert!(!is_valid_timestamp("2024-13-01"));
    assert!(!is_valid_timestamp("yesterday"));
    assert!(!is_valid_timestamp(""));
}

// ============================================================================
// Entity Collector Tests
// ============================================================================

#[test]
fn test_collect_startup_with_slug_and_updated_at() {
    let rows = vec![StartupRow {
        updated_at: Some("2024-01-01T00:00:00Z".to_string()),
        ..startup(Some("s1"), Some("acme"), "approved")
    }];
    let collected = collect_entities(&base(), &rows, &EntityOptions::startups(0.8));

    assert_eq!(collected.len(), 1);
    let entry = &collected.entries[0];
    assert_eq!(entry.url, "https://launchpad.example/startup/acme");
    assert_eq!(entry.last_modified.as_deref(), Some("2024-01-01T00:00:00Z"));
    assert_eq!(entry.change_frequency, Some(ChangeFrequency::Weekly));
    assert_eq!(entry.priority, Some(0.8));
}

#[test]
fn test_collect_startup_without_slug_uses_id() {
    let rows = vec![startup(Some("s2"), None, "approved")];
    let collected = collect_entities(&base(), &rows, &EntityOptions::startups(0.8));

    assert_eq!(collected.entries[0].url, "https://launchpad.example/startup/s2");
    assert!(collected.entries[0].last_modified.is_none());
}

#[test]
fn test_collect_posts_use_blog_path() {
    let rows = vec![PostRow {
        slug: Some("launch-week".to_string()),
        created_at: Some("2024-03-03T10:00:00Z".to_string()),
        ..PostRow::new("p1")
    }];
    let collected = collect_entities(&base(), &rows, &EntityOptions::posts(0.7));

    assert_eq!(
        collected.entries[0].url,
        "https://launchpad.example/blog/launch-week"
    );
    assert_eq!(
        collected.entries[0].last_modified.as_deref(),
        Some("2024-03-03T10:00:00Z")
    );
    assert_eq!(collected.entries[0].priority, Some(0.7));
}

#[test]
fn test_collect_entities_drops_only_unidentifiable_rows() {
    let rows = vec![
        PostRow::new("p1"),
        PostRow {
            id: None,
            updated_at: Some("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        },
        PostRow::new("p3"),
    ];
    let collected = collect_entities(&base(), &rows, &EntityOptions::posts(0.7));

    assert_eq!(collected.len(), 2);
    assert_eq!(collected.dropped.len(), 1);
    assert_eq!(collected.dropped[0].table, SourceTable::Posts);
    assert_eq!(collected.dropped[0].position, 1);
    assert_eq!(collected.dropped[0].reason, DropReason::MissingIdentifier);
}

#[test]
fn test_collect_entities_dot_slug_uses_id() {
    let rows = vec![
        PostRow {
            slug: Some("..".to_string()),
            ..PostRow::new("p1")
        },
        PostRow {
            slug: Some(".".to_string()),
            ..PostRow::new("p2")
        },
    ];
    let collected = collect_entities(&base(), &rows, &EntityOptions::posts(0.7));

    let urls: Vec<&str> = collected.entries.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://launchpad.example/blog/p1",
            "https://launchpad.example/blog/p2"
        ]
    );
}

#[test]
fn test_collect_entities_normalizes_lastmod() {
    let rows = vec![StartupRow {
        updated_at: Some("2024-03-05 10:15:00.482913+00".to_string()),
        ..startup(Some("s1"), Some("acme"), "approved")
    }];
    let collected = collect_entities(&base(), &rows, &EntityOptions::startups(0.8));

    assert_eq!(
        collected.entries[0].last_modified.as_deref(),
        Some("2024-03-05T10:15:00Z")
    );
}

#[test]
fn test_collect_categories_drops_dot_slug() {
    let rows = vec![CategoryRow::new(".."), CategoryRow::new("ai")];
    let collected = collect_categories(&base(), &rows, 0.8);

    assert_eq!(collected.len(), 1);
    assert_eq!(collected.entries[0].url, "https://launchpad.example/explore/ai");
    assert_eq!(collected.dropped[0].position, 0);
    assert_eq!(collected.dropped[0].reason, DropReason::MissingIdentifier);
}

#[test]
fn test_collect_positioned_keeps_input_positions() {
    let rows = vec![
        startup(Some("s1"), Some("acme"), "approved"),
        startup(None, None, "approved"),
    ];
    let subset = vec![(3, &rows[0]), (7, &rows[1])];
    let collected = collect_positioned(&base(), subset, &EntityOptions::startups(0.8));

    assert_eq!(collected.len(), 1);
    assert_eq!(collected.dropped.len(), 1);
    assert_eq!(collected.dropped[0].position, 7);
}

#[test]
fn test_collect_entities_empty_input() {
    let rows: Vec<StartupRow> = Vec::new();
    let collected = collect_entities(&base(), &rows, &EntityOptions::startups(0.8));
    assert!(collected.is_empty());
    assert!(collected.dropped.is_empty());
}

// ============================================================================
// Approval Filter Tests
// ============================================================================

#[test]
fn test_approved_only() {
    let rows = vec![
        startup(Some("s1"), Some("acme"), "approved"),
        startup(Some("s2"), Some("beta"), "pending"),
        startup(Some("s3"), Some("gamma"), "rejected"),
        startup(Some("s4"), Some("delta"), "approved"),
    ];
    let (approved, dropped) = approved_only(&rows, SourceTable::Startups);

    assert_eq!(approved.len(), 2);
    assert_eq!(approved[0].0, 0);
    assert_eq!(approved[0].1.slug.as_deref(), Some("acme"));
    assert_eq!(approved[1].0, 3);
    assert_eq!(approved[1].1.slug.as_deref(), Some("delta"));
    assert_eq!(dropped.len(), 2);
    assert!(dropped.iter().all(|d| d.reason == DropReason::NotApproved));
    assert!(dropped.iter().all(|d| d.table == SourceTable::Startups));
    assert_eq!(dropped[0].position, 1);
    assert_eq!(dropped[1].position, 2);
}

#[test]
fn test_approved_only_missing_status() {
    let rows = vec![StartupRow::new("s1")];
    let (approved, dropped) = approved_only(&rows, SourceTable::Startups);
    assert!(approved.is_empty());
    assert_eq!(dropped.len(), 1);
}

#[test]
fn test_approved_only_reports_given_table() {
    let rows = vec![startup(Some("s1"), Some("acme"), "pending")];
    let (_, dropped) = approved_only(&rows, SourceTable::Posts);
    assert_eq!(dropped[0].table, SourceTable::Posts);
}
