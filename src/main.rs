//! Listings EDA - Airbnb Listings CSV Analysis & Chart Generator
//!
//! Runs the pipeline end to end: load, filter/project, impute, aggregate,
//! render. Tabular dumps go to stdout; diagnostics go through tracing.

use anyhow::{Context, Result};
use clap::Parser;
use listings_eda::charts::ChartRenderer;
use listings_eda::data::{ListingsPipeline, SourceEncoding, TableLoader, RELEVANT_COLUMNS};
use listings_eda::report::{self, ReportContext};
use listings_eda::stats::{
    AccommodatesPrice, Aggregator, DescriptiveStats, NeighbourhoodPrice, YearlyRecord,
};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listings_eda")]
#[command(about = "Analyze a listings CSV and render price charts", long_about = None)]
struct Cli {
    /// Path to the listings CSV
    #[arg(value_name = "CSV", default_value = "Listings.csv")]
    input: PathBuf,

    /// City to keep
    #[arg(long, default_value = "Paris")]
    city: String,

    /// Directory for rendered charts and the optional report
    #[arg(long, default_value = "charts")]
    out_dir: PathBuf,

    /// Treat the input as UTF-8 instead of Latin-1
    #[arg(long, default_value_t = false)]
    utf8: bool,

    /// Also write a static HTML profiling report
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Open the rendered charts with the system viewer
    #[arg(long, default_value_t = false)]
    open: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let encoding = if cli.utf8 {
        SourceEncoding::Utf8
    } else {
        SourceEncoding::Latin1
    };

    info!(path = %cli.input.display(), ?encoding, "loading listings table");
    let raw = TableLoader::read_table(&cli.input, encoding, "host_since")?;

    println!("{}", raw.head(Some(5)));
    print_schema(&raw);
    print_describe(&raw);
    print_missing(&raw);

    let filtered = ListingsPipeline::filter_city(&raw, &cli.city)?;
    let listings = ListingsPipeline::select_columns(&filtered, &RELEVANT_COLUMNS)?;
    if listings.height() == 0 {
        warn!(city = %cli.city, "no rows match the city filter; summaries will be empty");
    }
    print_schema(&listings);
    print_describe(&listings);
    print_missing(&listings);

    let (listings, median) = ListingsPipeline::impute_median_date(&listings, "host_since")?;
    if let Some(median) = median {
        info!(%median, "filled missing host_since values with the median date");
    }

    let neighbourhood_means = Aggregator::neighbourhood_means(&listings)?;
    print_neighbourhood_summary(&neighbourhood_means);

    let top = Aggregator::top_neighbourhood(&neighbourhood_means).cloned();
    let accommodates_means = match &top {
        Some(top) => Aggregator::accommodates_means(&listings, &top.neighbourhood)?,
        None => Vec::new(),
    };
    print_accommodates_summary(&accommodates_means);

    let yearly_summary = Aggregator::yearly_summary(&listings)?;
    print_yearly_summary(&yearly_summary);

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let neighbourhood_png = cli.out_dir.join("price_by_neighbourhood.png");
    let accommodates_png = cli.out_dir.join("price_by_accommodates.png");
    let yearly_png = cli.out_dir.join("listings_over_time.png");

    let top_name = top.as_ref().map(|t| t.neighbourhood.as_str()).unwrap_or_default();
    ChartRenderer::render_neighbourhood_chart(&neighbourhood_means, &neighbourhood_png)?;
    ChartRenderer::render_accommodates_chart(&accommodates_means, top_name, &accommodates_png)?;
    ChartRenderer::render_yearly_chart(&yearly_summary, &yearly_png)?;
    info!(dir = %cli.out_dir.display(), "rendered 3 charts");

    if cli.report {
        let missing = ListingsPipeline::missing_counts(&listings);
        let describe = DescriptiveStats::describe(&listings);
        let source = cli.input.display().to_string();
        let ctx = ReportContext {
            source: &source,
            city: &cli.city,
            rows: listings.height(),
            schema: schema_of(&listings),
            missing: &missing,
            describe: &describe,
            neighbourhood_means: &neighbourhood_means,
            top_neighbourhood: top.as_ref().map(|t| t.neighbourhood.as_str()),
            accommodates_means: &accommodates_means,
            yearly_summary: &yearly_summary,
        };
        let report_path = cli.out_dir.join("report.html");
        report::write_html(&report_path, &ctx)?;
        info!(path = %report_path.display(), "wrote profiling report");
    }

    if cli.open {
        for path in [&neighbourhood_png, &accommodates_png, &yearly_png] {
            open::that(path).with_context(|| format!("failed to open {}", path.display()))?;
        }
    }

    Ok(())
}

fn schema_of(df: &DataFrame) -> Vec<(String, String)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.dtype().to_string()))
        .collect()
}

fn print_schema(df: &DataFrame) {
    println!("{} rows x {} columns", df.height(), df.width());
    for c in df.get_columns() {
        println!("  {:<16} {}", c.name().as_str(), c.dtype());
    }
    println!();
}

fn print_describe(df: &DataFrame) {
    let summaries = DescriptiveStats::describe(df);
    if summaries.is_empty() {
        return;
    }
    println!(
        "{:<16} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "missing", "mean", "median", "std", "min", "max"
    );
    for s in &summaries {
        println!(
            "{:<16} {:>8} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            s.name, s.count, s.missing, s.mean, s.median, s.std, s.min, s.max
        );
    }
    println!();
}

fn print_missing(df: &DataFrame) {
    println!("missing values:");
    for (name, count) in ListingsPipeline::missing_counts(df) {
        println!("  {name:<16} {count}");
    }
    println!();
}

fn print_neighbourhood_summary(summary: &[NeighbourhoodPrice]) {
    println!("average price by neighbourhood:");
    for row in summary {
        println!("  {:<28} {:>10.2}", row.neighbourhood, row.mean_price);
    }
    println!();
}

fn print_accommodates_summary(summary: &[AccommodatesPrice]) {
    println!("average price by accommodates:");
    for row in summary {
        println!("  {:<4} {:>10.2}", row.accommodates, row.mean_price);
    }
    println!();
}

fn print_yearly_summary(summary: &[YearlyRecord]) {
    println!("{:>6} {:>10} {:>14}", "year", "listings", "avg price");
    for row in summary {
        match row.average_price {
            Some(price) => println!("{:>6} {:>10} {:>14.2}", row.year, row.listing_count, price),
            None => println!("{:>6} {:>10} {:>14}", row.year, row.listing_count, "-"),
        }
    }
    println!();
}
