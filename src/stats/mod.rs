//! Stats module - grouped aggregates and descriptive statistics

mod aggregator;
mod describe;

pub use aggregator::{
    AccommodatesPrice, Aggregator, NeighbourhoodPrice, StatsError, YearlyRecord,
};
pub use describe::{ColumnSummary, DescriptiveStats};
