mod dates;
mod fetch;
mod output;
mod parser;
mod pipeline;
mod records;
mod review;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use dates::DateRange;
use fetch::HttpFetcher;
use settings::Settings;

#[derive(Parser)]
#[command(name = "pollen_history", about = "Daily pollen count history scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every day in the range and write the CSV files
    Scrape {
        /// First day to fetch (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day to fetch, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Directory for the output files (default: POLLEN_OUTPUT_DIR or "data")
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Pause between requests in milliseconds (default: POLLEN_DELAY_MS or 500)
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Summarize previously written counts files by severity level
    Review {
        /// Directory holding pollen_count_*.csv files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Scrape {
            start,
            end,
            out_dir,
            delay_ms,
        } => {
            if let Some(dir) = out_dir {
                settings.output_dir = dir;
            }
            if let Some(ms) = delay_ms {
                settings.delay_ms = ms;
            }
            scrape(&settings, start, end).await
        }
        Commands::Review { data_dir } => {
            let dir = data_dir.unwrap_or_else(|| settings.output_dir.clone());
            let files = review::count_files(&dir)?;
            if files.is_empty() {
                println!("No counts files in {}. Run 'scrape' first.", dir.display());
                return Ok(());
            }
            let rows = review::load_rows(&files)?;
            review::summarize(&rows).print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn scrape(settings: &Settings, start: NaiveDate, end: NaiveDate) -> anyhow::Result<()> {
    let range = DateRange::new(start, end)?;
    info!(base_url = %settings.base_url, delay_ms = settings.delay_ms, "Starting pollen scrape");

    let fetcher = HttpFetcher::new(&settings.base_url, &settings.user_agent, settings.timeout())
        .context("building HTTP client")?;
    let results = pipeline::run(&fetcher, &range, settings.delay()).await?;

    println!(
        "\nSuccessfully processed {} of {} days.\n",
        results.counts.len(),
        range.len()
    );
    if !results.errors.is_empty() {
        println!("The following errors occurred:");
        for e in &results.errors {
            println!("{} --- {}: {}", e.date, e.error_kind, e.detail);
        }
        println!();
    }

    let files = output::write_all(&results, &range, &settings.output_dir)?;
    println!("Counts:       {}", files.counts.display());
    println!("Contributors: {}", files.contributors.display());
    println!("Errors:       {}", files.errors.display());
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
