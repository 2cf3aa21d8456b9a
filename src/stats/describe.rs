//! Descriptive Statistics Module
//! Per-column summaries for the console dump and the HTML report.

use polars::prelude::*;
use serde::Serialize;

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p05: f64,
}

/// Computes descriptive statistics over the numeric columns of a frame.
pub struct DescriptiveStats;

impl DescriptiveStats {
    /// One [`ColumnSummary`] per numeric column, in frame order.
    pub fn describe(df: &DataFrame) -> Vec<ColumnSummary> {
        df.get_columns()
            .iter()
            .filter(|c| {
                matches!(
                    c.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .filter_map(|c| {
                let values: Vec<f64> = c
                    .cast(&DataType::Float64)
                    .ok()?
                    .f64()
                    .ok()?
                    .into_iter()
                    .flatten()
                    .collect();
                Some(Self::summarize(c.name().as_str(), &values, c.null_count()))
            })
            .collect()
    }

    /// Summarize a slice of non-missing values.
    pub fn summarize(name: &str, values: &[f64], missing: usize) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary {
                name: name.to_string(),
                count: 0,
                missing,
                mean: f64::NAN,
                median: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                p95: f64::NAN,
                p05: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        ColumnSummary {
            name: name.to_string(),
            count: n,
            missing,
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Percentile with linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_computes_sample_statistics() {
        let s = DescriptiveStats::summarize("price", &[1.0, 2.0, 3.0, 4.0], 1);
        assert_eq!(s.count, 4);
        assert_eq!(s.missing, 1);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!((s.p05 - 1.15).abs() < 1e-12);
        assert!((s.p95 - 3.85).abs() < 1e-12);
    }

    #[test]
    fn empty_column_summarizes_to_nans() {
        let s = DescriptiveStats::summarize("price", &[], 3);
        assert_eq!(s.count, 0);
        assert_eq!(s.missing, 3);
        assert!(s.mean.is_nan());
        assert!(s.median.is_nan());
    }

    #[test]
    fn describe_covers_only_numeric_columns() {
        let df = df!(
            "neighbourhood" => &["a", "b"],
            "accommodates" => &[2i64, 4],
            "price" => &[100.0, 300.0],
        )
        .unwrap();

        let summaries = DescriptiveStats::describe(&df);
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["accommodates", "price"]);
        assert!((summaries[1].mean - 200.0).abs() < 1e-12);
    }
}
