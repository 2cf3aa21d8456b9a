//! Aggregator Module
//! The three derived tables: mean price by neighbourhood, mean price by
//! accommodation size in the most expensive neighbourhood, and the yearly
//! listing count / average price summary.
//!
//! Grouping is stable and ties sort in first-occurrence order, so every
//! summary is deterministic for a given input.

use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Mean price for one neighbourhood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbourhoodPrice {
    pub neighbourhood: String,
    pub mean_price: f64,
}

/// Mean price for one accommodation capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccommodatesPrice {
    pub accommodates: i64,
    pub mean_price: f64,
}

/// One calendar year of the resampled time series. `average_price` is
/// `None` for years with no listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyRecord {
    pub year: i32,
    pub listing_count: u32,
    pub average_price: Option<f64>,
}

/// Pure aggregate computations over the imputed listings table.
pub struct Aggregator;

impl Aggregator {
    /// Mean price per neighbourhood, sorted ascending by mean. Rows with
    /// a missing neighbourhood are excluded from the summary.
    pub fn neighbourhood_means(df: &DataFrame) -> Result<Vec<NeighbourhoodPrice>, StatsError> {
        let out = df
            .clone()
            .lazy()
            .group_by_stable([col("neighbourhood")])
            .agg([col("price").mean()])
            .sort(
                ["price"],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        let names = out.column("neighbourhood")?.as_materialized_series().str()?;
        let means = out.column("price")?.as_materialized_series().f64()?;
        Ok(names
            .into_iter()
            .zip(means)
            .filter_map(|(name, mean)| {
                Some(NeighbourhoodPrice {
                    neighbourhood: name?.to_string(),
                    mean_price: mean?,
                })
            })
            .collect())
    }

    /// The entry with the maximum mean price. Among ties the entry whose
    /// first row appeared earliest in the data wins.
    pub fn top_neighbourhood(summary: &[NeighbourhoodPrice]) -> Option<&NeighbourhoodPrice> {
        let mut best: Option<&NeighbourhoodPrice> = None;
        for entry in summary {
            match best {
                Some(b) if entry.mean_price <= b.mean_price => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    /// Mean price per accommodation capacity within one neighbourhood,
    /// sorted ascending by mean.
    pub fn accommodates_means(
        df: &DataFrame,
        neighbourhood: &str,
    ) -> Result<Vec<AccommodatesPrice>, StatsError> {
        let out = df
            .clone()
            .lazy()
            .filter(col("neighbourhood").eq(lit(neighbourhood)))
            .with_columns([col("accommodates").cast(DataType::Int64)])
            .group_by_stable([col("accommodates")])
            .agg([col("price").mean()])
            .sort(
                ["price"],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        let caps = out.column("accommodates")?.as_materialized_series().i64()?;
        let means = out.column("price")?.as_materialized_series().f64()?;
        Ok(caps
            .into_iter()
            .zip(means)
            .filter_map(|(cap, mean)| {
                Some(AccommodatesPrice {
                    accommodates: cap?,
                    mean_price: mean?,
                })
            })
            .collect())
    }

    /// Listing count and mean price per calendar year of `host_since`,
    /// densified over the full observed span: years without listings
    /// carry a count of 0 and no average.
    pub fn yearly_summary(df: &DataFrame) -> Result<Vec<YearlyRecord>, StatsError> {
        let grouped = df
            .clone()
            .lazy()
            .select([col("host_since").dt().year().alias("year"), col("price")])
            .group_by_stable([col("year")])
            .agg([
                len().alias("listing_count"),
                col("price").mean().alias("average_price"),
            ])
            .sort(["year"], SortMultipleOptions::default())
            .collect()?;

        let years = grouped.column("year")?.as_materialized_series().i32()?;
        let counts = grouped.column("listing_count")?.as_materialized_series().u32()?;
        let means = grouped.column("average_price")?.as_materialized_series().f64()?;

        let observed: Vec<(i32, u32, Option<f64>)> = years
            .into_iter()
            .zip(counts)
            .zip(means)
            .filter_map(|((year, count), mean)| Some((year?, count?, mean)))
            .collect();

        let (Some(&(first, ..)), Some(&(last, ..))) = (observed.first(), observed.last()) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::with_capacity((last - first + 1) as usize);
        let mut pending = observed.iter().peekable();
        for year in first..=last {
            match pending.peek() {
                Some(&&(y, count, mean)) if y == year => {
                    records.push(YearlyRecord {
                        year,
                        listing_count: count,
                        average_price: mean,
                    });
                    pending.next();
                }
                _ => records.push(YearlyRecord {
                    year,
                    listing_count: 0,
                    average_price: None,
                }),
            }
        }
        Ok(records)
    }
}
