//! Profiling Report Module
//! Writes a static HTML profiling report from finished pipeline results.
//! Optional collaborator outside the core pipeline, enabled by a flag.

use crate::stats::{AccommodatesPrice, ColumnSummary, NeighbourhoodPrice, YearlyRecord};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize summaries: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the report renders. Borrowed from the pipeline's results;
/// the report never recomputes.
pub struct ReportContext<'a> {
    pub source: &'a str,
    pub city: &'a str,
    pub rows: usize,
    pub schema: Vec<(String, String)>,
    pub missing: &'a [(String, usize)],
    pub describe: &'a [ColumnSummary],
    pub neighbourhood_means: &'a [NeighbourhoodPrice],
    pub top_neighbourhood: Option<&'a str>,
    pub accommodates_means: &'a [AccommodatesPrice],
    pub yearly_summary: &'a [YearlyRecord],
}

#[derive(Serialize)]
struct SummaryDump<'a> {
    neighbourhood_means: &'a [NeighbourhoodPrice],
    top_neighbourhood: Option<&'a str>,
    accommodates_means: &'a [AccommodatesPrice],
    yearly_summary: &'a [YearlyRecord],
}

/// Write the report to `path` as a single self-contained HTML file.
pub fn write_html(path: &Path, ctx: &ReportContext) -> Result<(), ReportError> {
    let mut file = File::create(path)?;
    file.write_all(render(ctx)?.as_bytes())?;
    Ok(())
}

fn render(ctx: &ReportContext) -> Result<String, ReportError> {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Data Profiling Report</title>\n<style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; margin-bottom: 2em; }\n\
         th, td { border: 1px solid #999; padding: 4px 10px; text-align: left; }\n\
         th { background: #eee; }\n\
         </style>\n</head>\n<body>\n",
    );
    html.push_str("<h1>Data Profiling Report</h1>\n");
    html.push_str(&format!(
        "<p>Source: <code>{}</code> &mdash; city filter: <strong>{}</strong> &mdash; {} rows</p>\n",
        escape(ctx.source),
        escape(ctx.city),
        ctx.rows
    ));

    html.push_str("<h2>Schema</h2>\n<table>\n<tr><th>Column</th><th>Type</th><th>Missing</th></tr>\n");
    for (name, dtype) in &ctx.schema {
        let missing = ctx
            .missing
            .iter()
            .find(|(n, _)| n == name)
            .map_or(0, |(_, c)| *c);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(name),
            escape(dtype),
            missing
        ));
    }
    html.push_str("</table>\n");

    html.push_str(
        "<h2>Descriptive Statistics</h2>\n<table>\n\
         <tr><th>Column</th><th>Count</th><th>Mean</th><th>Median</th><th>Std</th>\
         <th>Min</th><th>Max</th><th>P05</th><th>P95</th></tr>\n",
    );
    for s in ctx.describe {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.3}</td><td>{:.3}</td><td>{:.3}</td>\
             <td>{:.3}</td><td>{:.3}</td><td>{:.3}</td><td>{:.3}</td></tr>\n",
            escape(&s.name),
            s.count,
            s.mean,
            s.median,
            s.std,
            s.min,
            s.max,
            s.p05,
            s.p95
        ));
    }
    html.push_str("</table>\n");

    html.push_str(
        "<h2>Average Price by Neighbourhood</h2>\n<table>\n\
         <tr><th>Neighbourhood</th><th>Mean Price</th></tr>\n",
    );
    for row in ctx.neighbourhood_means {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td></tr>\n",
            escape(&row.neighbourhood),
            row.mean_price
        ));
    }
    html.push_str("</table>\n");

    if let Some(top) = ctx.top_neighbourhood {
        html.push_str(&format!(
            "<h2>Average Price by Accommodates in {}</h2>\n",
            escape(top)
        ));
    } else {
        html.push_str("<h2>Average Price by Accommodates</h2>\n");
    }
    html.push_str("<table>\n<tr><th>Accommodates</th><th>Mean Price</th></tr>\n");
    for row in ctx.accommodates_means {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td></tr>\n",
            row.accommodates, row.mean_price
        ));
    }
    html.push_str("</table>\n");

    html.push_str(
        "<h2>Listings Over Time</h2>\n<table>\n\
         <tr><th>Year</th><th>Listings</th><th>Average Price</th></tr>\n",
    );
    for row in ctx.yearly_summary {
        let avg = row
            .average_price
            .map_or_else(|| "&mdash;".to_string(), |p| format!("{p:.2}"));
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.year, row.listing_count, avg
        ));
    }
    html.push_str("</table>\n");

    let dump = SummaryDump {
        neighbourhood_means: ctx.neighbourhood_means,
        top_neighbourhood: ctx.top_neighbourhood,
        accommodates_means: ctx.accommodates_means,
        yearly_summary: ctx.yearly_summary,
    };
    html.push_str("<script type=\"application/json\" id=\"summaries\">\n");
    html.push_str(&serde_json::to_string_pretty(&dump)?);
    html.push_str("\n</script>\n</body>\n</html>\n");
    Ok(html)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(
        missing: &'a [(String, usize)],
        describe: &'a [ColumnSummary],
        hoods: &'a [NeighbourhoodPrice],
        caps: &'a [AccommodatesPrice],
        yearly: &'a [YearlyRecord],
    ) -> ReportContext<'a> {
        ReportContext {
            source: "Listings.csv",
            city: "Paris",
            rows: 2,
            schema: vec![
                ("neighbourhood".into(), "str".into()),
                ("price".into(), "f64".into()),
            ],
            missing,
            describe,
            neighbourhood_means: hoods,
            top_neighbourhood: Some("Le Marais"),
            accommodates_means: caps,
            yearly_summary: yearly,
        }
    }

    #[test]
    fn report_contains_the_derived_tables_and_json_dump() {
        let missing = vec![("price".to_string(), 0usize)];
        let hoods = vec![NeighbourhoodPrice {
            neighbourhood: "Le <Marais> & Co".into(),
            mean_price: 200.0,
        }];
        let caps = vec![AccommodatesPrice {
            accommodates: 2,
            mean_price: 100.0,
        }];
        let yearly = vec![YearlyRecord {
            year: 2015,
            listing_count: 0,
            average_price: None,
        }];

        let ctx = context(&missing, &[], &hoods, &caps, &yearly);
        let html = render(&ctx).unwrap();

        assert!(html.contains("Data Profiling Report"));
        assert!(html.contains("Le &lt;Marais&gt; &amp; Co"));
        assert!(html.contains("Average Price by Accommodates in Le Marais"));
        assert!(html.contains("<td>2015</td><td>0</td><td>&mdash;</td>"));
        assert!(html.contains("\"top_neighbourhood\": \"Le Marais\""));
    }

    #[test]
    fn write_html_creates_the_file() {
        let missing = vec![];
        let ctx = context(&missing, &[], &[], &[], &[]);
        let path = std::env::temp_dir().join("listings_eda_report_test.html");
        write_html(&path, &ctx).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        std::fs::remove_file(&path).ok();
    }
}
