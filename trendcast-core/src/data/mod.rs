//! Bar sources and caches.

pub mod binance;
pub mod coindcx;
pub mod csv_file;
pub mod memory_cache;
pub mod parquet_store;
pub mod provider;
pub mod router;
pub mod synthetic;

pub use binance::BinanceProvider;
pub use coindcx::CoinDcxProvider;
pub use csv_file::{export_enriched_csv, read_bars, write_enriched_csv, CsvProvider};
pub use memory_cache::{CachedProvider, MemoryCache};
pub use parquet_store::{ParquetStore, StoreMeta};
pub use provider::{
    fetch_or_empty, DataError, DataProvider, DataSource, FetchRequest, DEFAULT_LIMIT,
};
pub use router::ExchangeRouter;
pub use synthetic::{series_from_closes, SyntheticProvider};
