use crate::error::{Result, SourceError};
use launchpad_core::{CategoryRow, PostRow, SiteRows, SourceTable, StartupRow};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CATEGORY_COLUMNS: &str = "slug";
const STARTUP_COLUMNS: &str = "id,slug,status,updated_at,created_at";
const POST_COLUMNS: &str = "id,slug,updated_at,created_at";

/// Reads source rows from a PostgREST-compatible backend
/// (`{endpoint}/rest/v1/{table}?select=...`).
pub struct RestSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    approved_only: bool,
}

impl RestSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(format!(
                "{}: not a base URL",
                endpoint
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("Launchpad/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: None,
            approved_only: false,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Ask the backend for approved startups only instead of filtering locally.
    pub fn with_approved_only(mut self, approved_only: bool) -> Self {
        self.approved_only = approved_only;
        self
    }

    pub fn table_url(&self, table: SourceTable) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["rest", "v1", table.as_str()]);
        }

        {
            let mut query = url.query_pairs_mut();
            match table {
                SourceTable::Categories => {
                    query
                        .append_pair("select", CATEGORY_COLUMNS)
                        .append_pair("order", "slug.asc");
                }
                SourceTable::Startups => {
                    query.append_pair("select", STARTUP_COLUMNS);
                    if self.approved_only {
                        query.append_pair("status", "eq.approved");
                    }
                }
                SourceTable::Posts => {
                    query.append_pair("select", POST_COLUMNS);
                }
            }
        }

        url
    }

    async fn fetch_table<T: DeserializeOwned>(&self, table: SourceTable) -> Result<Vec<T>> {
        let url = self.table_url(table);
        debug!("Fetching {} from {}", table, url);
        let start = Instant::now();

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(ref key) = self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} failed with status {}", table, status);
            return Err(SourceError::Status {
                table,
                status: status.as_u16(),
            });
        }

        let rows: Vec<T> = response.json().await?;
        debug!(
            "Fetched {} {} rows in {:?}",
            rows.len(),
            table,
            start.elapsed()
        );
        Ok(rows)
    }

    pub async fn fetch_categories(&self) -> Result<Vec<CategoryRow>> {
        self.fetch_table(SourceTable::Categories).await
    }

    pub async fn fetch_startups(&self) -> Result<Vec<StartupRow>> {
        self.fetch_table(SourceTable::Startups).await
    }

    pub async fn fetch_posts(&self) -> Result<Vec<PostRow>> {
        self.fetch_table(SourceTable::Posts).await
    }

    /// Fetches all three tables concurrently; any failure fails the whole fetch.
    pub async fn fetch_all(&self) -> Result<SiteRows> {
        info!("Fetching site rows from {}", self.endpoint);
        let (categories, startups, posts) = tokio::try_join!(
            self.fetch_categories(),
            self.fetch_startups(),
            self.fetch_posts()
        )?;

        Ok(SiteRows {
            categories,
            startups,
            posts,
        })
    }

    /// Fetches all three tables concurrently, substituting an empty table for
    /// each one that failed. The failures are returned for the caller to report.
    pub async fn fetch_lenient(&self) -> (SiteRows, Vec<(SourceTable, SourceError)>) {
        info!("Fetching site rows from {}", self.endpoint);
        let (categories, startups, posts) = tokio::join!(
            self.fetch_categories(),
            self.fetch_startups(),
            self.fetch_posts()
        );

        let mut failures = Vec::new();
        let rows = SiteRows {
            categories: or_empty(SourceTable::Categories, categories, &mut failures),
            startups: or_empty(SourceTable::Startups, startups, &mut failures),
            posts: or_empty(SourceTable::Posts, posts, &mut failures),
        };

        (rows, failures)
    }
}

fn or_empty<T>(
    table: SourceTable,
    result: Result<Vec<T>>,
    failures: &mut Vec<(SourceTable, SourceError)>,
) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Using an empty {} table: {}", table, e);
            failures.push((table, e));
            Vec::new()
        }
    }
}
