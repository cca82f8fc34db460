//! Local CSV bars: import as a provider, export of enriched series.
//!
//! Import expects a header with `timestamp,open,high,low,close,volume`. The
//! timestamp may be integer milliseconds, RFC 3339, or a `YYYY-MM-DD` date.

use super::provider::{finish_series, DataError, DataProvider, DataSource, FetchRequest};
use crate::domain::{Bar, PriceSeries};
use crate::enrich::EnrichedSeries;
use crate::features::FeatureColumn;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Serves bars from one CSV file regardless of the requested symbol.
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Read every bar of a CSV file, in file order.
pub fn read_bars<R: std::io::Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            DataError::ResponseFormat(format!(
                "row {}: unrecognised timestamp '{}'",
                i + 1,
                row.timestamp
            ))
        })?;
        bars.push(Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    Ok(bars)
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        let file = std::fs::File::open(&self.path)?;
        let bars = read_bars(std::io::BufReader::new(file))?;
        tracing::debug!(path = %self.path.display(), rows = bars.len(), "read csv bars");
        finish_series(request, bars)
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }
}

const EXPORT_COLUMNS: [FeatureColumn; 6] = [
    FeatureColumn::Rsi,
    FeatureColumn::Macd,
    FeatureColumn::BollingerHigh,
    FeatureColumn::BollingerLow,
    FeatureColumn::SmaShort,
    FeatureColumn::SmaLong,
];

/// Write bars plus indicator columns as CSV. Warm-up NaNs become empty cells.
pub fn write_enriched_csv<W: Write>(enriched: &EnrichedSeries, writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp", "open", "high", "low", "close", "volume"];
    header.extend(EXPORT_COLUMNS.iter().map(|c| c.as_str()));
    wtr.write_record(&header)?;

    let cell = |v: f64| if v.is_nan() { String::new() } else { v.to_string() };
    for (row, bar) in enriched.bars().iter().enumerate() {
        let mut record = vec![
            bar.timestamp.to_rfc3339(),
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(bar.close),
            cell(bar.volume),
        ];
        for col in EXPORT_COLUMNS {
            record.push(cell(enriched.value(col, row).unwrap_or(f64::NAN)));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export to a file path.
pub fn export_enriched_csv(enriched: &EnrichedSeries, path: &Path) -> Result<(), DataError> {
    let file = std::fs::File::create(path)?;
    write_enriched_csv(enriched, std::io::BufWriter::new(file))
}
