//! Data layer integration: store snapshots, memory cache, CSV round trip and
//! the fetch-failure contract.

use std::time::Duration;
use trendcast_core::data::{
    export_enriched_csv, fetch_or_empty, CachedProvider, CsvProvider, DataError, DataProvider,
    DataSource, FetchRequest, ParquetStore, SyntheticProvider,
};
use trendcast_core::domain::Timeframe;
use trendcast_core::{enrich, IndicatorConfig};

#[test]
fn fetched_series_survives_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = ParquetStore::new(dir.path());
    let request = FetchRequest::new("BTC/USDT", Timeframe::H4, 120);

    let fetched = CachedProvider::new(SyntheticProvider::default(), Duration::from_secs(60))
        .fetch(&request)
        .unwrap();
    let meta = store.write(&fetched, DataSource::Synthetic).unwrap();
    assert_eq!(meta.bar_count, 120);

    let offline = store.fetch(&request).unwrap();
    assert_eq!(offline, fetched);
    assert_eq!(store.source(), DataSource::Cache);
}

#[test]
fn offline_store_without_snapshot_yields_empty_series() {
    let dir = tempfile::tempdir().unwrap();
    let store = ParquetStore::new(dir.path());
    let request = FetchRequest::new("SOL/USDT", Timeframe::D1, 50);

    assert!(matches!(
        store.fetch(&request),
        Err(DataError::NoCachedData { .. })
    ));
    let series = fetch_or_empty(&store, &request);
    assert!(series.is_empty());
    assert_eq!(series.symbol(), "SOL/USDT");
}

#[test]
fn exported_csv_reimports_bars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enriched.csv");
    let series = SyntheticProvider::default().generate(&FetchRequest::new("ETH/INR", Timeframe::D1, 60));
    let enriched = enrich(series.clone(), &IndicatorConfig::default());
    export_enriched_csv(&enriched, &path).unwrap();

    let reimported = CsvProvider::new(&path)
        .fetch(&FetchRequest::new("ETH/INR", Timeframe::D1, 60))
        .unwrap();
    assert_eq!(reimported.len(), 60);
    assert_eq!(reimported.bars(), series.bars());
}
