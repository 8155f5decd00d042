use crate::commands::DEFAULT_CONFIG_DIR;
use anyhow::{Context, Result, bail};
use chrono::{SecondsFormat, Utc};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use launchpad_core::render::{generate_robots_txt, render_manifest, save_document};
use launchpad_core::{
    BaseUrl, BuildOptions, BuildReport, ConfigError, DropReason, ManifestFormat, SiteConfig,
    SiteRows, SourceFilter, SourceTable, build_manifest,
};
use launchpad_source::{RestSource, SnapshotStore, load_snapshot_json, save_snapshot_json};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "site.json";
pub const STORE_FILE_NAME: &str = "launchpad.db";
pub const SITEMAP_FILE_NAME: &str = "sitemap.xml";
pub const ROBOTS_FILE_NAME: &str = "robots.txt";
pub const DEFAULT_INIT_BASE_URL: &str = "http://localhost:3000";

// Everything decorative goes to stderr; stdout is reserved for documents

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "launchpad".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!("{}", "sitemap and robots for the startup directory".bright_black());
    eprintln!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Site configuration from `--config`, with `--base-url` taking precedence.
pub fn load_site_config(args: &ArgMatches) -> Result<SiteConfig> {
    let config_path = args.get_one::<String>("config").map(|p| expand_path(p));
    let base_url = args.get_one::<String>("base-url");

    let config = match (config_path, base_url) {
        (Some(path), base_url) => {
            let mut config = SiteConfig::load(&path)
                .with_context(|| format!("Failed to load site config {}", path.display()))?;
            if let Some(base_url) = base_url {
                config.base_url = BaseUrl::parse(base_url)?;
            }
            config
        }
        (None, Some(base_url)) => SiteConfig::new(base_url)?,
        (None, None) => return Err(ConfigError::MissingBaseUrl.into()),
    };

    Ok(config)
}

pub fn build_options(args: &ArgMatches) -> BuildOptions {
    let filter = if args.get_flag("pre-filtered") {
        SourceFilter::PreFiltered
    } else {
        SourceFilter::ApprovedOnly
    };
    let static_stamp = args
        .get_flag("stamp-static")
        .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

    BuildOptions {
        filter,
        static_stamp,
    }
}

fn new_spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn rest_source(args: &ArgMatches, endpoint: &str, approved_only: bool) -> Result<RestSource> {
    let mut source = RestSource::new(endpoint)?.with_approved_only(approved_only);
    if let Some(api_key) = args.get_one::<String>("api-key") {
        source = source.with_api_key(api_key.as_str());
    }
    Ok(source)
}

/// Rows from whichever source flag was given. Without one the manifest
/// only lists static pages.
pub async fn load_rows(args: &ArgMatches, quiet: bool) -> Result<SiteRows> {
    if let Some(endpoint) = args.get_one::<String>("rest") {
        let source = rest_source(args, endpoint, !args.get_flag("pre-filtered"))?;

        let spinner = new_spinner(quiet)?;
        spinner.set_message(format!("Fetching rows from {}", endpoint));
        let (rows, failures) = source.fetch_lenient().await;
        spinner.finish_and_clear();

        if !quiet {
            for (table, error) in &failures {
                eprintln!(
                    "{} {} unavailable, listing none: {}",
                    "⚠".yellow().bold(),
                    table.as_str().bright_white(),
                    error
                );
            }
        }
        return Ok(rows);
    }

    if let Some(path) = args.get_one::<PathBuf>("db") {
        if !SnapshotStore::exists(path) {
            bail!("Snapshot store not found: {}", path.display());
        }
        let store = SnapshotStore::open(path)
            .with_context(|| format!("Failed to open snapshot store {}", path.display()))?;
        // Moderation is left to the build so rejected rows get reported
        return Ok(store.load_rows(false)?);
    }

    if let Some(path) = args.get_one::<PathBuf>("snapshot") {
        let rows = load_snapshot_json(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        return Ok(rows);
    }

    warn!("No row source given, listing static pages only");
    Ok(SiteRows::default())
}

async fn build_from_args(args: &ArgMatches, quiet: bool) -> Result<(SiteConfig, BuildReport)> {
    let config = load_site_config(args)?;
    let rows = load_rows(args, quiet).await?;
    let report = build_manifest(&config, &rows, &build_options(args));
    Ok((config, report))
}

fn print_build_summary(report: &BuildReport) {
    let stats = report.manifest.stats();
    eprintln!(
        "{} {} entries ({} duplicates, {} rejected)",
        "✓".green().bold(),
        stats.emitted.to_string().bright_white(),
        stats.duplicates,
        stats.rejected
    );

    let missing = report.dropped_count(DropReason::MissingIdentifier);
    if missing > 0 {
        eprintln!(
            "{} {} rows skipped without slug or id",
            "⚠".yellow().bold(),
            missing.to_string().yellow()
        );
    }
}

fn write_output(content: &str, output: Option<&PathBuf>, quiet: bool) -> Result<()> {
    match output {
        Some(path) => {
            save_document(content, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let force = args.get_flag("force");
    let raw_dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_DIR);
    let base_url = args
        .get_one::<String>("base-url")
        .map(String::as_str)
        .unwrap_or(DEFAULT_INIT_BASE_URL);

    let config_dir = expand_path(raw_dir);
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    let store_path = config_dir.join(STORE_FILE_NAME);

    if !force && (config_path.exists() || SnapshotStore::exists(&store_path)) {
        bail!(
            "Configuration already exists in {}. Use --force to overwrite.",
            config_dir.display()
        );
    }

    let config = SiteConfig::new(base_url)?;

    if !quiet {
        print_divider();
        println!("{}", "  LAUNCHPAD INITIALIZATION".bright_white().bold());
        print_divider();
        println!();
    }

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    if SnapshotStore::exists(&store_path) {
        SnapshotStore::remove(&store_path)
            .with_context(|| format!("Failed to remove {}", store_path.display()))?;
    }
    SnapshotStore::open(&store_path)
        .with_context(|| format!("Failed to create {}", store_path.display()))?;

    info!("Initialized {}", config_dir.display());

    if !quiet {
        report_created("Site config", &config_path);
        report_created("Snapshot store", &store_path);
        println!();
        println!(
            "{} Edit {} to set the public base URL.",
            "ℹ".blue(),
            config_path.display().to_string().bright_white()
        );
        println!();
    }

    Ok(())
}

fn report_created(label: &str, path: &Path) {
    println!(
        "{} {}: {}",
        "✓".green().bold(),
        label,
        path.display().to_string().bright_white()
    );
}

pub async fn handle_sitemap(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let (config, report) = build_from_args(args, quiet).await?;

    let format = args
        .get_one::<String>("format")
        .and_then(|f| f.parse::<ManifestFormat>().ok())
        .unwrap_or(ManifestFormat::Xml);
    let document = render_manifest(&report.manifest, format, &config.base_url)?;

    if !quiet {
        print_build_summary(&report);
    }
    write_output(&document, args.get_one::<PathBuf>("output"), quiet)
}

pub fn handle_robots(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let mut config = load_site_config(args)?;

    if let Some(paths) = args.get_many::<String>("disallow") {
        config = config.with_disallow_paths(paths.cloned().collect());
    }

    let robots = generate_robots_txt(&config.disallow_paths, &config.sitemap_url());
    write_output(&robots, args.get_one::<PathBuf>("output"), quiet)
}

pub async fn handle_generate(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let out_dir = args
        .get_one::<PathBuf>("out-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let (config, report) = build_from_args(args, quiet).await?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let sitemap_path = out_dir.join(SITEMAP_FILE_NAME);
    save_document(&report.manifest.render_sitemap(), &sitemap_path)
        .with_context(|| format!("Failed to write {}", sitemap_path.display()))?;

    let robots_path = out_dir.join(ROBOTS_FILE_NAME);
    let robots = generate_robots_txt(&config.disallow_paths, &config.sitemap_url());
    save_document(&robots, &robots_path)
        .with_context(|| format!("Failed to write {}", robots_path.display()))?;

    info!(
        "Wrote {} and {}",
        sitemap_path.display(),
        robots_path.display()
    );

    if !quiet {
        print_build_summary(&report);
        for path in [&sitemap_path, &robots_path] {
            eprintln!(
                "{} Saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
    }

    Ok(())
}

pub async fn handle_sync(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let Some(db_path) = args.get_one::<PathBuf>("db") else {
        bail!("--db must be provided");
    };

    let rows = if let Some(endpoint) = args.get_one::<String>("rest") {
        // The store mirrors the backend, so nothing is filtered and any
        // failed table aborts rather than wiping stored rows
        let source = rest_source(args, endpoint, false)?;
        let spinner = new_spinner(quiet)?;
        spinner.set_message(format!("Fetching rows from {}", endpoint));
        let fetched = source.fetch_all().await;
        spinner.finish_and_clear();
        fetched.with_context(|| format!("Failed to fetch rows from {}", endpoint))?
    } else if let Some(path) = args.get_one::<PathBuf>("snapshot") {
        load_snapshot_json(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?
    } else {
        bail!("Either --rest or --snapshot must be provided");
    };

    let mut store = SnapshotStore::open(db_path)
        .with_context(|| format!("Failed to open snapshot store {}", db_path.display()))?;
    store.import(&rows)?;

    if let Some(export) = args.get_one::<PathBuf>("export") {
        save_snapshot_json(&rows, export)
            .with_context(|| format!("Failed to write {}", export.display()))?;
    }

    info!("Synced snapshot store {}", db_path.display());

    if !quiet {
        for table in [
            SourceTable::Categories,
            SourceTable::Startups,
            SourceTable::Posts,
        ] {
            println!(
                "{} {}: {}",
                "✓".green().bold(),
                table.as_str(),
                store.count(table)?.to_string().cyan()
            );
        }
    }

    Ok(())
}
