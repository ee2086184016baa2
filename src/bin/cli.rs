//! Racing results CLI
//!
//! Captures one day's results listing and publishes the new races.

use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use racing_results::{
    error::Result,
    models::Config,
    pipeline::{self, Collaborators, RunOptions},
    services::{HttpImageFetcher, RandomPacer, renderer_from_config},
    storage::{BlobStore, LocalBlobStore, LocalTableStore, TableNames, TableStore},
    utils::http,
};

/// Horse racing results capture
#[derive(Parser, Debug)]
#[command(
    name = "racing-results",
    version,
    about = "Capture race results pages into structured records"
)]
struct Cli {
    /// Results listing URL (default: yesterday's time-order listing)
    url: Option<String>,

    /// Raw data output file (default: ./raw_data/{yesterday}.json)
    out_file: Option<PathBuf>,

    /// Silk image directory
    #[arg(default_value = "./images/")]
    image_dir: PathBuf,

    /// Re-extract races already captured
    #[arg(default_value_t = false, action = clap::ArgAction::Set)]
    force: bool,

    /// Path to the configuration file
    #[arg(short, long, default_value = "racing.toml")]
    config: PathBuf,

    /// Write to the *_test tables
    #[arg(long)]
    testing: bool,

    /// Publish the races saved in OUT_FILE instead of scraping
    #[arg(long)]
    from_document: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn default_url(day: NaiveDate) -> String {
    format!(
        "https://www.racingpost.com/results/{}/time-order/",
        day.format("%Y-%m-%d")
    )
}

fn default_out_file(day: NaiveDate) -> PathBuf {
    PathBuf::from(format!("./raw_data/{}.json", day.format("%Y%m%d")))
}

#[cfg(feature = "s3")]
async fn blob_store(config: &Config) -> Box<dyn BlobStore> {
    match &config.storage.s3_bucket {
        Some(bucket) => {
            log::info!("Uploading to s3://{}", bucket);
            let store =
                racing_results::storage::S3BlobStore::from_env(bucket, &config.storage.s3_region)
                    .await;
            Box::new(store)
        }
        None => Box::new(LocalBlobStore::new(&config.storage.blob_dir)),
    }
}

#[cfg(not(feature = "s3"))]
async fn blob_store(config: &Config) -> Box<dyn BlobStore> {
    if config.storage.s3_bucket.is_some() {
        log::warn!("Built without the s3 feature; using the local blob store");
    }
    Box::new(LocalBlobStore::new(&config.storage.blob_dir))
}

#[cfg(feature = "postgres")]
async fn table_store(config: &Config, names: TableNames) -> Result<Box<dyn TableStore>> {
    match &config.storage.database_url {
        Some(url) => {
            let store = racing_results::storage::PgTableStore::connect(url, names).await?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(LocalTableStore::new(&config.storage.tables_dir, names))),
    }
}

#[cfg(not(feature = "postgres"))]
async fn table_store(config: &Config, names: TableNames) -> Result<Box<dyn TableStore>> {
    if config.storage.database_url.is_some() {
        log::warn!("Built without the postgres feature; using local table files");
    }
    Ok(Box::new(LocalTableStore::new(&config.storage.tables_dir, names)))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Racing results capture starting...");

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let yesterday = Local::now().date_naive() - Duration::days(1);
    let options = RunOptions {
        url: cli.url.unwrap_or_else(|| default_url(yesterday)),
        out_file: cli.out_file.unwrap_or_else(|| default_out_file(yesterday)),
        image_dir: cli.image_dir,
        force: cli.force,
        from_document: cli.from_document,
    };
    log::info!(
        "Listing {} -> {} (force: {})",
        options.url,
        options.out_file.display(),
        options.force
    );

    let renderer = renderer_from_config(&config.scraper)?;
    let images = HttpImageFetcher::new(http::create_async_client(&config.scraper)?);
    let page_pacer = RandomPacer::from_range(config.pacing.page_range());
    let image_pacer = RandomPacer::from_range(config.pacing.image_range());

    let names = TableNames::new(cli.testing || config.storage.testing);
    let blobs = blob_store(&config).await;
    let tables = table_store(&config, names).await?;

    let deps = Collaborators {
        renderer: renderer.as_ref(),
        page_pacer: &page_pacer,
        image_pacer: &image_pacer,
        images: &images,
        blobs: blobs.as_ref(),
        tables: tables.as_ref(),
    };

    let summary = pipeline::run(&config, &options, &deps).await?;

    println!("Races:      {}", summary.races);
    println!("Prize rows: {}", summary.prize_rows);
    println!("Horse rows: {}", summary.horse_rows);
    if summary.skipped > 0 {
        println!("Skipped:    {}", summary.skipped);
    }
    if summary.format_issues > 0 {
        println!("Format warnings: {}", summary.format_issues);
    }

    Ok(())
}
