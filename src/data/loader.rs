//! CSV Loader Module
//! Reads a delimited file with a declared source encoding into a Polars
//! DataFrame, parsing one named column as calendar dates.

use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input is not valid {0}")]
    Encoding(&'static str),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Declared character encoding of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    /// ISO-8859-1. Every byte maps to the Unicode scalar with the same
    /// value, so decoding is total.
    Latin1,
}

/// Loads a CSV file into a DataFrame with Polars.
pub struct TableLoader;

impl TableLoader {
    /// Read `path`, decode it as `encoding`, parse the CSV, and cast
    /// `date_column` to a date. Cells that fail date parsing become
    /// nulls; a missing file or an invalid encoding is fatal.
    pub fn read_table(
        path: &Path,
        encoding: SourceEncoding,
        date_column: &str,
    ) -> Result<DataFrame, LoaderError> {
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = Self::decode(&bytes, encoding)?;
        let df = Self::parse_csv(&text)?;
        Ok(Self::parse_date_column(df, date_column)?)
    }

    /// Decode raw file bytes according to the declared encoding.
    pub fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<String, LoaderError> {
        match encoding {
            SourceEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| LoaderError::Encoding("UTF-8")),
            SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Parse decoded CSV text into a DataFrame with inferred dtypes.
    pub fn parse_csv(text: &str) -> Result<DataFrame, LoaderError> {
        let cursor = Cursor::new(text.as_bytes().to_vec());
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(cursor)
            .finish()?;
        Ok(df)
    }

    /// Cast a string column to `Date`, leaving nulls where parsing fails.
    /// A column that is already a date passes through unchanged.
    pub fn parse_date_column(df: DataFrame, name: &str) -> Result<DataFrame, PolarsError> {
        if df.column(name)?.dtype() == &DataType::Date {
            return Ok(df);
        }
        df.lazy()
            .with_columns([col(name)
                .str()
                .to_date(StrptimeOptions {
                    format: None,
                    strict: false,
                    exact: true,
                    cache: true,
                })
                .alias(name)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_bytes_decode_to_matching_scalars() {
        let decoded = TableLoader::decode(&[0x50, 0xE9, 0x72, 0x65], SourceEncoding::Latin1)
            .expect("latin-1 decoding is total");
        assert_eq!(decoded, "Pére");
    }

    #[test]
    fn invalid_utf8_is_a_fatal_encoding_error() {
        let err = TableLoader::decode(&[0xE9, 0x72], SourceEncoding::Utf8).unwrap_err();
        assert!(matches!(err, LoaderError::Encoding(_)));
    }

    #[test]
    fn unparseable_dates_become_nulls() {
        let csv = "host_since,price\n2015-03-01,100.0\nnot-a-date,50.0\n,75.0\n";
        let df = TableLoader::parse_csv(csv).unwrap();
        let df = TableLoader::parse_date_column(df, "host_since").unwrap();

        let dates = df.column("host_since").unwrap();
        assert_eq!(dates.dtype(), &DataType::Date);
        assert_eq!(dates.null_count(), 2);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn date_typed_column_passes_through() {
        let csv = "host_since,price\n2015-03-01,100.0\n";
        let df = TableLoader::parse_csv(csv).unwrap();
        let once = TableLoader::parse_date_column(df, "host_since").unwrap();
        let twice = TableLoader::parse_date_column(once.clone(), "host_since").unwrap();
        assert_eq!(once.column("host_since").unwrap().dtype(), &DataType::Date);
        assert_eq!(twice.column("host_since").unwrap().dtype(), &DataType::Date);
    }
}
