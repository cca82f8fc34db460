//! Plain-text rendering for the terminal.

use trendcast_core::data::StoreMeta;
use trendcast_core::domain::{Provenance, TrendVerdict};
use trendcast_core::EnrichedSeries;

const HEADERS: [&str; 12] = [
    "Time", "Open", "High", "Low", "Close", "Volume", "RSI", "MACD", "BB High", "BB Low",
    "SMA S", "SMA L",
];

pub fn print_header(enriched: &EnrichedSeries) {
    let series = enriched.series();
    println!();
    println!("=== {} {} ===", series.symbol(), series.timeframe());
    if let (Some(first), Some(last)) = (series.bars().first(), series.last()) {
        println!(
            "Bars:           {} ({} to {})",
            series.len(),
            first.timestamp.format("%Y-%m-%d %H:%M"),
            last.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
}

fn cell(v: f64) -> String {
    if v.is_nan() {
        "-".into()
    } else {
        format!("{v:.2}")
    }
}

/// Render rows as an aligned table, one line per bar.
pub fn table_lines(enriched: &EnrichedSeries) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = vec![HEADERS.iter().map(|h| h.to_string()).collect()];
    for (i, bar) in enriched.bars().iter().enumerate() {
        rows.push(vec![
            bar.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(bar.close),
            cell(bar.volume),
            cell(enriched.rsi[i]),
            cell(enriched.macd[i]),
            cell(enriched.bollinger_high[i]),
            cell(enriched.bollinger_low[i]),
            cell(enriched.sma_short[i]),
            cell(enriched.sma_long[i]),
        ]);
    }

    let widths: Vec<usize> = (0..HEADERS.len())
        .map(|c| rows.iter().map(|r| r[c].len()).max().unwrap_or(0))
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .enumerate()
                .map(|(c, (text, &w))| {
                    if c == 0 {
                        format!("{text:<w$}")
                    } else {
                        format!("{text:>w$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect()
}

pub fn print_table(enriched: &EnrichedSeries) {
    for line in table_lines(enriched) {
        println!("{line}");
    }
}

pub fn print_verdict_details(verdict: &TrendVerdict) {
    println!("Last close:     {:.2}", verdict.last_close);
    match &verdict.provenance {
        Provenance::Model => {}
        Provenance::Heuristic(_) => match (verdict.short_ma, verdict.long_ma) {
            (Some(short), Some(long)) => {
                println!("SMA short/long: {short:.2} / {long:.2}");
            }
            _ => println!("SMA short/long: not enough history"),
        },
    }
}

pub fn print_cache_rows(metas: &[StoreMeta], sizes: &[u64]) {
    println!(
        "{:<12} {:<5} {:<35} {:>8} {:>10}",
        "Symbol", "TF", "Range", "Bars", "Size"
    );
    println!("{}", "-".repeat(74));
    for (meta, &size) in metas.iter().zip(sizes) {
        let range = format!(
            "{} to {}",
            meta.start.format("%Y-%m-%d %H:%M"),
            meta.end.format("%Y-%m-%d %H:%M")
        );
        println!(
            "{:<12} {:<5} {:<35} {:>8} {:>10}",
            meta.symbol,
            meta.timeframe.as_str(),
            range,
            meta.bar_count,
            format_size(size)
        );
    }
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendcast_core::data::series_from_closes;
    use trendcast_core::domain::Timeframe;
    use trendcast_core::{enrich, IndicatorConfig};

    #[test]
    fn table_is_aligned_with_placeholders() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let enriched = enrich(
            series_from_closes("BTC/USDT", Timeframe::D1, &closes),
            &IndicatorConfig::default(),
        );
        let lines = table_lines(&enriched.tail(3));
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Time"));
        let width = lines[0].len();
        assert!(lines.iter().all(|l| l.len() == width));
        // SMA-50 is undefined at 30 bars
        assert!(lines[3].ends_with(" -"));
        assert!(lines[3].contains("129.00"));
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
