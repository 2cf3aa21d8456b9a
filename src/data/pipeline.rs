//! Pipeline Stages Module
//! Filter/projection and median-date imputation. Every operation takes a
//! DataFrame and returns a fresh one; row order is preserved throughout.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

/// Columns that survive projection, in output order.
pub const RELEVANT_COLUMNS: [&str; 5] =
    ["host_since", "neighbourhood", "accommodates", "city", "price"];

/// Days between 0001-01-01 (CE) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("column {column:?} has no non-missing dates to take a median from")]
    EmptyDateColumn { column: String },
}

/// Filter/Projector and Imputer stages.
pub struct ListingsPipeline;

impl ListingsPipeline {
    /// Keep only rows whose `city` column equals `city`.
    pub fn filter_city(df: &DataFrame, city: &str) -> Result<DataFrame, PipelineError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col("city").eq(lit(city)))
            .collect()?;
        Ok(filtered)
    }

    /// Reduce the frame to exactly `names`, in that order. An absent
    /// column is fatal.
    pub fn select_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame, PipelineError> {
        let exprs: Vec<Expr> = names.iter().map(|n| col(*n)).collect();
        Ok(df.clone().lazy().select(exprs).collect()?)
    }

    /// Replace missing values in the date column with the median of its
    /// non-missing values. For an even count the median is the mean of
    /// the two middle day numbers, floored to a whole day.
    ///
    /// Returns the imputed frame and the median used, `None` when the
    /// frame had no rows. Errors if rows exist but every date is missing.
    pub fn impute_median_date(
        df: &DataFrame,
        column: &str,
    ) -> Result<(DataFrame, Option<NaiveDate>), PipelineError> {
        let dates = df.column(column)?.as_materialized_series().date()?;
        let mut days: Vec<i32> = dates.into_iter().flatten().collect();

        if days.is_empty() {
            if df.height() == 0 {
                return Ok((df.clone(), None));
            }
            return Err(PipelineError::EmptyDateColumn {
                column: column.to_string(),
            });
        }

        days.sort_unstable();
        let n = days.len();
        let median_days = if n % 2 == 0 {
            ((days[n / 2 - 1] as i64 + days[n / 2] as i64) / 2) as i32
        } else {
            days[n / 2]
        };

        let filled = df
            .clone()
            .lazy()
            .with_columns([col(column)
                .fill_null(lit(median_days).cast(DataType::Date))
                .alias(column)])
            .collect()?;

        let median = NaiveDate::from_num_days_from_ce_opt(median_days + UNIX_EPOCH_DAYS_FROM_CE)
            .ok_or_else(|| PipelineError::EmptyDateColumn {
                column: column.to_string(),
            })?;
        Ok((filled, Some(median)))
    }

    /// Null count per column, for the console dump.
    pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TableLoader;

    fn listings_frame() -> DataFrame {
        let csv = "host_since,neighbourhood,accommodates,city,price,noise\n\
                   2015-03-01,Le Marais,2,Paris,100.0,a\n\
                   2015-06-01,Le Marais,4,Paris,300.0,b\n\
                   2014-02-10,Centrum,2,Amsterdam,120.0,c\n\
                   ,Montmartre,3,Paris,80.0,d\n";
        let df = TableLoader::parse_csv(csv).unwrap();
        TableLoader::parse_date_column(df, "host_since").unwrap()
    }

    #[test]
    fn filter_keeps_matching_rows_in_order() {
        let df = listings_frame();
        let paris = ListingsPipeline::filter_city(&df, "Paris").unwrap();
        assert_eq!(paris.height(), 3);

        let hoods = paris.column("neighbourhood").unwrap();
        let hoods = hoods.as_materialized_series().str().unwrap();
        let got: Vec<&str> = hoods.into_iter().flatten().collect();
        assert_eq!(got, ["Le Marais", "Le Marais", "Montmartre"]);
    }

    #[test]
    fn projection_yields_exactly_the_requested_columns() {
        let df = listings_frame();
        let projected = ListingsPipeline::select_columns(&df, &RELEVANT_COLUMNS).unwrap();
        let names: Vec<String> = projected
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, RELEVANT_COLUMNS);
    }

    #[test]
    fn projecting_an_absent_column_is_fatal() {
        let df = listings_frame();
        let err = ListingsPipeline::select_columns(&df, &["host_since", "bedrooms"]);
        assert!(matches!(err, Err(PipelineError::Polars(_))));
    }

    #[test]
    fn imputation_fills_nulls_with_the_median_date() {
        let csv = "host_since,price\n2015-01-01,1.0\n2015-01-09,2.0\n2015-01-03,3.0\n,4.0\n";
        let df = TableLoader::parse_csv(csv).unwrap();
        let df = TableLoader::parse_date_column(df, "host_since").unwrap();

        let (filled, median) = ListingsPipeline::impute_median_date(&df, "host_since").unwrap();
        assert_eq!(median, NaiveDate::from_ymd_opt(2015, 1, 3));
        assert_eq!(filled.column("host_since").unwrap().null_count(), 0);

        let dates = filled.column("host_since").unwrap();
        let dates = dates.as_materialized_series().date().unwrap();
        let last: i32 = dates.into_iter().flatten().last().unwrap();
        assert_eq!(
            NaiveDate::from_num_days_from_ce_opt(last + UNIX_EPOCH_DAYS_FROM_CE),
            NaiveDate::from_ymd_opt(2015, 1, 3)
        );
    }

    #[test]
    fn even_count_median_is_the_mean_of_the_middle_days() {
        let csv = "host_since,price\n2015-01-01,1.0\n2015-01-03,2.0\n";
        let df = TableLoader::parse_csv(csv).unwrap();
        let df = TableLoader::parse_date_column(df, "host_since").unwrap();

        let (_, median) = ListingsPipeline::impute_median_date(&df, "host_since").unwrap();
        assert_eq!(median, NaiveDate::from_ymd_opt(2015, 1, 2));
    }

    #[test]
    fn all_missing_dates_cannot_be_imputed() {
        let csv = "host_since,price\n,1.0\n,2.0\n";
        let df = TableLoader::parse_csv(csv).unwrap();
        let df = TableLoader::parse_date_column(df, "host_since").unwrap();

        let err = ListingsPipeline::impute_median_date(&df, "host_since");
        assert!(matches!(
            err,
            Err(PipelineError::EmptyDateColumn { .. })
        ));
    }

    #[test]
    fn empty_frame_has_nothing_to_impute() {
        let df = listings_frame();
        let none = ListingsPipeline::filter_city(&df, "Oslo").unwrap();
        assert_eq!(none.height(), 0);

        let (out, median) = ListingsPipeline::impute_median_date(&none, "host_since").unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(median, None);
    }

    #[test]
    fn missing_counts_reports_per_column_nulls() {
        let df = listings_frame();
        let counts = ListingsPipeline::missing_counts(&df);
        let host_since = counts.iter().find(|(n, _)| n == "host_since").unwrap();
        assert_eq!(host_since.1, 1);
        let city = counts.iter().find(|(n, _)| n == "city").unwrap();
        assert_eq!(city.1, 0);
    }
}
