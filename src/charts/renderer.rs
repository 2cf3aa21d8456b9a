//! Chart Renderer Module
//! Renders the three derived tables as static PNG charts with Plotters.
//! No aggregation happens here; every series is drawn exactly as given.

use crate::stats::{AccommodatesPrice, NeighbourhoodPrice, YearlyRecord};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const BAR_CHART_SIZE: (u32, u32) = (1200, 800);
const TIMELINE_CHART_SIZE: (u32, u32) = (1400, 600);

/// Series colors for the dual-axis timeline.
const COUNT_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
const PRICE_COLOR: RGBColor = RGBColor(243, 156, 18); // Orange

/// Bar palette, cycled per category.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(233, 30, 99),  // Pink
    RGBColor(0, 188, 212),  // Cyan
    RGBColor(255, 87, 34),  // Deep Orange
    RGBColor(121, 85, 72),  // Brown
    RGBColor(96, 125, 139), // Blue Grey
];

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to render {chart}: {detail}")]
    Backend { chart: &'static str, detail: String },
}

/// Renders summary tables as chart images.
pub struct ChartRenderer;

impl ChartRenderer {
    /// Horizontal bar chart: neighbourhood vs mean price, in the
    /// summary's ascending order.
    pub fn render_neighbourhood_chart(
        summary: &[NeighbourhoodPrice],
        path: &Path,
    ) -> Result<(), ChartError> {
        Self::draw_neighbourhood(summary, path).map_err(|e| ChartError::Backend {
            chart: "neighbourhood price chart",
            detail: e.to_string(),
        })
    }

    /// Vertical bar chart: accommodation capacity vs mean price within
    /// `neighbourhood`, named in the title.
    pub fn render_accommodates_chart(
        summary: &[AccommodatesPrice],
        neighbourhood: &str,
        path: &Path,
    ) -> Result<(), ChartError> {
        Self::draw_accommodates(summary, neighbourhood, path).map_err(|e| ChartError::Backend {
            chart: "accommodates price chart",
            detail: e.to_string(),
        })
    }

    /// Dual-axis line chart over years: listing count on the left axis,
    /// average price on the right, both clamped to zero, no gridlines.
    pub fn render_yearly_chart(records: &[YearlyRecord], path: &Path) -> Result<(), ChartError> {
        Self::draw_yearly(records, path).map_err(|e| ChartError::Backend {
            chart: "listings over time chart",
            detail: e.to_string(),
        })
    }

    fn draw_neighbourhood(
        summary: &[NeighbourhoodPrice],
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let title = "Average Price by Neighbourhood in Paris";
        if summary.is_empty() {
            root.titled(title, ("sans-serif", 30))?;
            root.present()?;
            return Ok(());
        }

        let n = summary.len() as i32;
        let x_max = axis_max(summary.iter().map(|r| r.mean_price));
        let labels: Vec<String> = summary.iter().map(|r| r.neighbourhood.clone()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(200)
            .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc("Average Price (€)")
            .y_desc("Neighbourhood")
            .y_label_formatter(&|seg: &SegmentValue<i32>| match seg {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i as usize).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .y_labels(summary.len())
            .label_style(("sans-serif", 14))
            .draw()?;

        chart.draw_series(summary.iter().enumerate().map(|(i, row)| {
            let color = PALETTE[i % PALETTE.len()];
            Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i as i32)),
                    (row.mean_price, SegmentValue::Exact(i as i32 + 1)),
                ],
                color.filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn draw_accommodates(
        summary: &[AccommodatesPrice],
        neighbourhood: &str,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        if summary.is_empty() {
            root.titled("Average Price by Accommodates", ("sans-serif", 30))?;
            root.present()?;
            return Ok(());
        }

        let title = format!("Average Price by Accommodates in {neighbourhood}, Paris");
        let n = summary.len() as i32;
        let y_max = axis_max(summary.iter().map(|r| r.mean_price));
        let labels: Vec<String> = summary.iter().map(|r| r.accommodates.to_string()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30))
            .margin(12)
            .x_label_area_size(56)
            .y_label_area_size(72)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Number of Accommodates")
            .y_desc("Average Price (€)")
            .x_label_formatter(&|seg: &SegmentValue<i32>| match seg {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i as usize).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .x_labels(summary.len())
            .label_style(("sans-serif", 14))
            .draw()?;

        chart.draw_series(summary.iter().enumerate().map(|(i, row)| {
            let color = PALETTE[i % PALETTE.len()];
            Rectangle::new(
                [
                    (SegmentValue::Exact(i as i32), 0.0),
                    (SegmentValue::Exact(i as i32 + 1), row.mean_price),
                ],
                color.filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn draw_yearly(
        records: &[YearlyRecord],
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, TIMELINE_CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let title = "Number of Listings and Average Price Over Time in Paris";
        if records.is_empty() {
            root.titled(title, ("sans-serif", 30))?;
            root.present()?;
            return Ok(());
        }

        let (x_min, x_max) = year_bounds(records);
        let count_max = axis_max(records.iter().map(|r| r.listing_count as f64));
        let price_max = axis_max(records.iter().filter_map(|r| r.average_price));

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .right_y_label_area_size(72)
            .build_cartesian_2d(x_min..x_max, 0f64..count_max)?
            .set_secondary_coord(x_min..x_max, 0f64..price_max);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Year")
            .y_desc("Number of Listings")
            .label_style(("sans-serif", 14))
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Average Price (€)")
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                records.iter().map(|r| (r.year, r.listing_count as f64)),
                COUNT_COLOR.stroke_width(2),
            ))?
            .label("Number of Listings")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], COUNT_COLOR.stroke_width(2))
            });
        chart.draw_series(records.iter().map(|r| {
            Circle::new((r.year, r.listing_count as f64), 4, COUNT_COLOR.filled())
        }))?;

        let price_points: Vec<(i32, f64)> = records
            .iter()
            .filter_map(|r| r.average_price.map(|p| (r.year, p)))
            .collect();
        chart
            .draw_secondary_series(LineSeries::new(
                price_points.iter().copied(),
                PRICE_COLOR.stroke_width(2),
            ))?
            .label("Average Price (€)")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], PRICE_COLOR.stroke_width(2))
            });
        chart.draw_secondary_series(
            price_points
                .iter()
                .map(|&(x, y)| TriangleMarker::new((x, y), 5, PRICE_COLOR.filled())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .label_font(("sans-serif", 16))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// Value-axis upper bound: 10% headroom above the series maximum, with a
/// floor of 1.0 so degenerate series still get a drawable range.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Year-axis bounds; a single observed year is widened by one on each
/// side so the range is never empty.
fn year_bounds(records: &[YearlyRecord]) -> (i32, i32) {
    let first = records.first().map_or(0, |r| r.year);
    let last = records.last().map_or(0, |r| r.year);
    if first == last {
        (first - 1, last + 1)
    } else {
        (first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_max_adds_headroom() {
        assert!((axis_max([2.0, 10.0, 4.0].into_iter()) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn axis_max_of_nothing_is_drawable() {
        assert_eq!(axis_max(std::iter::empty()), 1.0);
    }

    #[test]
    fn single_year_bounds_are_widened() {
        let records = vec![YearlyRecord {
            year: 2015,
            listing_count: 3,
            average_price: Some(100.0),
        }];
        assert_eq!(year_bounds(&records), (2014, 2016));
    }

    #[test]
    fn multi_year_bounds_span_the_records() {
        let records = vec![
            YearlyRecord {
                year: 2014,
                listing_count: 1,
                average_price: Some(100.0),
            },
            YearlyRecord {
                year: 2016,
                listing_count: 2,
                average_price: None,
            },
        ];
        assert_eq!(year_bounds(&records), (2014, 2016));
    }
}
