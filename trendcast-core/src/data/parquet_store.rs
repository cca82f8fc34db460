//! Parquet snapshot store with Hive-style partitioning.
//!
//! Layout: `{dir}/symbol={BASE}-{QUOTE}/{timeframe}.parquet`
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Integrity validation on load (schema check, row count > 0)
//! - Quarantine for corrupt files ({filename}.quarantined)
//! - Metadata sidecar per snapshot (`{timeframe}.meta.json`: hash, range, source)

use super::provider::{DataError, DataProvider, DataSource, FetchRequest};
use crate::domain::{Bar, PriceSeries, Timeframe};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Metadata sidecar for one cached snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: DataSource,
    pub cached_at: DateTime<Utc>,
}

pub struct ParquetStore {
    dir: PathBuf,
}

impl ParquetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/symbol={BASE}-{QUOTE}/`
    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("symbol={}", symbol.replace('/', "-")))
    }

    fn data_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{timeframe}.parquet"))
    }

    fn meta_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{timeframe}.meta.json"))
    }

    /// Replace the snapshot for the series' symbol and timeframe.
    pub fn write(&self, series: &PriceSeries, source: DataSource) -> Result<StoreMeta, DataError> {
        let (first, last) = match (series.bars().first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DataError::Other("no bars to cache".into())),
        };

        let symbol = series.symbol();
        let timeframe = series.timeframe();
        fs::create_dir_all(self.symbol_dir(symbol))?;

        let mut df = bars_to_dataframe(series.bars())?;
        let path = self.data_path(symbol, timeframe);
        let tmp_path = path.with_extension("parquet.tmp");
        write_parquet(&mut df, &tmp_path)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Io(e)
        })?;

        let bars_json = serde_json::to_vec(series.bars())
            .map_err(|e| DataError::Other(format!("hash serialization: {e}")))?;
        let meta = StoreMeta {
            symbol: symbol.to_string(),
            timeframe,
            start: first.timestamp,
            end: last.timestamp,
            bar_count: series.len(),
            data_hash: blake3::hash(&bars_json).to_hex().to_string(),
            source,
            cached_at: Utc::now(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::Other(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(symbol, timeframe), meta_json)?;

        tracing::info!(
            symbol,
            timeframe = %timeframe,
            bars = meta.bar_count,
            path = %path.display(),
            "snapshot written"
        );
        Ok(meta)
    }

    /// Load a snapshot. A corrupt file is quarantined and reported as missing.
    pub fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries, DataError> {
        let path = self.data_path(symbol, timeframe);
        let missing = || DataError::NoCachedData {
            symbol: symbol.to_string(),
            timeframe,
        };
        if !path.exists() {
            return Err(missing());
        }

        match load_and_validate_parquet(&path) {
            Ok(bars) => Ok(PriceSeries::new(symbol, timeframe, bars)?),
            Err(e) => {
                let quarantine = path.with_extension("parquet.quarantined");
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "quarantining corrupt cache file"
                );
                let _ = fs::rename(&path, &quarantine);
                Err(missing())
            }
        }
    }

    pub fn meta(&self, symbol: &str, timeframe: Timeframe) -> Option<StoreMeta> {
        let content = fs::read_to_string(self.meta_path(symbol, timeframe)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Every snapshot with a readable sidecar, sorted by symbol then timeframe.
    pub fn status(&self) -> Result<Vec<StoreMeta>, DataError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut metas = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_name().to_string_lossy().starts_with("symbol=") {
                continue;
            }
            for file in fs::read_dir(entry.path())? {
                let path = file?.path();
                let is_meta = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".meta.json"));
                if !is_meta {
                    continue;
                }
                // Sidecars that fail to parse are skipped rather than guessed at.
                if let Some(meta) = fs::read_to_string(&path)
                    .ok()
                    .and_then(|c| serde_json::from_str::<StoreMeta>(&c).ok())
                {
                    metas.push(meta);
                }
            }
        }
        metas.sort_by(|a, b| (&a.symbol, a.timeframe).cmp(&(&b.symbol, b.timeframe)));
        Ok(metas)
    }

    /// Snapshots cached more than `unused_days` ago. Removed unless `dry_run`.
    pub fn clean(&self, unused_days: u64, dry_run: bool) -> Result<Vec<StoreMeta>, DataError> {
        let cutoff = Utc::now() - chrono::Duration::days(unused_days as i64);
        let stale: Vec<StoreMeta> = self
            .status()?
            .into_iter()
            .filter(|m| m.cached_at < cutoff)
            .collect();
        if dry_run {
            return Ok(stale);
        }
        for meta in &stale {
            self.remove(&meta.symbol, meta.timeframe)?;
        }
        Ok(stale)
    }

    pub fn remove(&self, symbol: &str, timeframe: Timeframe) -> Result<(), DataError> {
        for path in [
            self.data_path(symbol, timeframe),
            self.meta_path(symbol, timeframe),
        ] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        // Only succeeds once the last snapshot for the symbol is gone.
        let _ = fs::remove_dir(self.symbol_dir(symbol));
        tracing::info!(symbol, timeframe = %timeframe, "snapshot removed");
        Ok(())
    }

    /// Size in bytes of one snapshot's parquet file.
    pub fn size_of(&self, symbol: &str, timeframe: Timeframe) -> u64 {
        fs::metadata(self.data_path(symbol, timeframe))
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

/// Serves requests from the store only; no network.
impl DataProvider for ParquetStore {
    fn name(&self) -> &str {
        "parquet-store"
    }

    fn source(&self) -> DataSource {
        DataSource::Cache
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        Ok(self
            .load(&request.symbol, request.timeframe)?
            .tail(request.limit))
    }

    fn is_available(&self) -> bool {
        self.dir.exists()
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn bars_to_dataframe(bars: &[Bar]) -> Result<DataFrame, DataError> {
    let timestamps: Vec<i64> = bars.iter().map(Bar::timestamp_ms).collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("timestamp".into(), timestamps),
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file = fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = fs::File::open(path)?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::Parquet("empty parquet file".into()));
    }
    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(DataError::Parquet(format!("missing column '{name}'")));
        }
    }
    dataframe_to_bars(&df)
}

fn col_err(name: &str, e: PolarsError) -> DataError {
    DataError::Parquet(format!("{name} column: {e}"))
}

fn f64_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, DataError> {
    df.column(name)
        .and_then(|c| c.f64())
        .map_err(|e| col_err(name, e))
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<Bar>, DataError> {
    let ts_ca = df
        .column("timestamp")
        .and_then(|c| c.i64())
        .map_err(|e| col_err("timestamp", e))?;
    let open_ca = f64_column(df, "open")?;
    let high_ca = f64_column(df, "high")?;
    let low_ca = f64_column(df, "low")?;
    let close_ca = f64_column(df, "close")?;
    let vol_ca = f64_column(df, "volume")?;

    (0..df.height())
        .map(|i| {
            let ms = ts_ca
                .get(i)
                .ok_or_else(|| DataError::Parquet(format!("null timestamp at row {i}")))?;
            let timestamp = DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| DataError::Parquet(format!("invalid timestamp {ms} at row {i}")))?;
            Ok(Bar {
                timestamp,
                open: open_ca.get(i).unwrap_or(f64::NAN),
                high: high_ca.get(i).unwrap_or(f64::NAN),
                low: low_ca.get(i).unwrap_or(f64::NAN),
                close: close_ca.get(i).unwrap_or(f64::NAN),
                volume: vol_ca.get(i).unwrap_or(f64::NAN),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticProvider;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, ParquetStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = ParquetStore::new(tmp.path());
        (tmp, store)
    }

    fn sample_series(symbol: &str, timeframe: Timeframe) -> PriceSeries {
        SyntheticProvider::default().generate(&FetchRequest::new(symbol, timeframe, 40))
    }

    #[test]
    fn write_and_load_roundtrip() {
        let (tmp, store) = temp_store();
        let dir = tmp.path();
        let series = sample_series("BTC/USDT", Timeframe::D1);

        store.write(&series, DataSource::Synthetic).unwrap();
        assert!(dir.join("symbol=BTC-USDT").join("1d.parquet").exists());
        let loaded = store.load("BTC/USDT", Timeframe::D1).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn load_missing_is_no_cached_data() {
        let (_tmp, store) = temp_store();
        assert!(matches!(
            store.load("ETH/USDT", Timeframe::H1),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn corrupt_file_is_quarantined() {
        let (tmp, store) = temp_store();
        let dir = tmp.path();
        let sym_dir = dir.join("symbol=BTC-USDT");
        fs::create_dir_all(&sym_dir).unwrap();
        fs::write(sym_dir.join("1d.parquet"), b"definitely not parquet").unwrap();

        assert!(store.load("BTC/USDT", Timeframe::D1).is_err());
        assert!(!sym_dir.join("1d.parquet").exists());
        assert!(sym_dir.join("1d.parquet.quarantined").exists());
    }

    #[test]
    fn meta_and_status() {
        let (_tmp, store) = temp_store();
        let daily = sample_series("BTC/USDT", Timeframe::D1);
        store.write(&daily, DataSource::Binance).unwrap();
        store
            .write(&sample_series("BTC/USDT", Timeframe::H1), DataSource::Binance)
            .unwrap();
        store
            .write(&sample_series("ADA/INR", Timeframe::D1), DataSource::CoinDcx)
            .unwrap();

        let meta = store.meta("BTC/USDT", Timeframe::D1).unwrap();
        assert_eq!(meta.bar_count, 40);
        assert_eq!(meta.start, daily.bars()[0].timestamp);
        assert_eq!(meta.source, DataSource::Binance);

        let status = store.status().unwrap();
        let keys: Vec<(String, Timeframe)> =
            status.iter().map(|m| (m.symbol.clone(), m.timeframe)).collect();
        assert_eq!(
            keys,
            vec![
                ("ADA/INR".to_string(), Timeframe::D1),
                ("BTC/USDT".to_string(), Timeframe::H1),
                ("BTC/USDT".to_string(), Timeframe::D1),
            ]
        );
    }

    #[test]
    fn clean_respects_age_and_dry_run() {
        let (tmp, store) = temp_store();
        let dir = tmp.path();
        store
            .write(&sample_series("BTC/USDT", Timeframe::D1), DataSource::Synthetic)
            .unwrap();

        // fresh snapshot survives a 1-day cutoff
        assert!(store.clean(1, false).unwrap().is_empty());

        // backdate the sidecar
        let mut meta = store.meta("BTC/USDT", Timeframe::D1).unwrap();
        meta.cached_at -= chrono::Duration::days(10);
        fs::write(
            store.meta_path("BTC/USDT", Timeframe::D1),
            serde_json::to_string(&meta).unwrap(),
        )
        .unwrap();

        assert_eq!(store.clean(5, true).unwrap().len(), 1);
        assert!(store.load("BTC/USDT", Timeframe::D1).is_ok());

        assert_eq!(store.clean(5, false).unwrap().len(), 1);
        assert!(store.status().unwrap().is_empty());
        assert!(!dir.join("symbol=BTC-USDT").exists());
    }

    #[test]
    fn store_as_provider_applies_limit() {
        let (_tmp, store) = temp_store();
        store
            .write(&sample_series("BTC/USDT", Timeframe::D1), DataSource::Synthetic)
            .unwrap();
        let series = store
            .fetch(&FetchRequest::new("BTC/USDT", Timeframe::D1, 10))
            .unwrap();
        assert_eq!(series.len(), 10);
    }
}
