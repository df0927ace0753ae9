//! CSV price data adapter and trade log export.

use crate::domain::backtest::BacktestResult;
use crate::domain::bar::Bar;
use crate::domain::error::GorkError;
use crate::domain::execution::Trade;
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OUTPUT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads a headered CSV with `Date`, `Time`, `Open`, `High`, `Low`, `Close`
/// columns. Column order does not matter and extra columns are ignored.
pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    date: usize,
    time: Option<usize>,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, GorkError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| GorkError::DataLoad {
                reason: format!("missing {name} column"),
            })
        };

        Ok(Columns {
            date: require("date")?,
            time: find("time"),
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
        })
    }
}

impl DataPort for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, GorkError> {
        let file = File::open(&self.path).map_err(|e| GorkError::DataLoad {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = rdr.headers().map_err(|e| GorkError::DataLoad {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Self::locate_columns(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| GorkError::DataLoad {
                reason: format!("CSV parse error: {}", e),
            })?;
            let row = record.position().map_or(0, |p| p.line());

            let date = record.get(columns.date).unwrap_or_default();
            let stamp = match columns.time.and_then(|i| record.get(i)) {
                Some(time) => format!("{date} {time}"),
                None => date.to_string(),
            };
            let timestamp = parse_timestamp(&stamp).ok_or_else(|| GorkError::DataLoad {
                reason: format!("row {row}: invalid timestamp '{stamp}'"),
            })?;

            bars.push(Bar {
                timestamp,
                open: parse_price(&record, columns.open, "open", row)?,
                high: parse_price(&record, columns.high, "high", row)?,
                low: parse_price(&record, columns.low, "low", row)?,
                close: parse_price(&record, columns.close, "close", row)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        let duplicates = bars
            .windows(2)
            .filter(|w| w[0].timestamp == w[1].timestamp)
            .count();
        if duplicates > 0 {
            tracing::warn!(path = %self.path.display(), duplicates, "duplicate timestamps in price data");
        }
        tracing::info!(path = %self.path.display(), rows = bars.len(), "loaded price data");
        Ok(bars)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
    row: u64,
) -> Result<f64, GorkError> {
    let raw = record.get(index).ok_or_else(|| GorkError::DataLoad {
        reason: format!("row {row}: missing {column} value"),
    })?;
    raw.parse().map_err(|e| GorkError::DataLoad {
        reason: format!("row {row}: invalid {column} value '{raw}': {e}"),
    })
}

/// Streams closed trades from one or more variants into a single CSV.
pub struct TradeLogWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl TradeLogWriter<File> {
    pub fn create(path: &Path) -> Result<Self, GorkError> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> TradeLogWriter<W> {
    pub fn new(inner: W) -> Result<Self, GorkError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer
            .write_record([
                "variant",
                "entry_time",
                "exit_time",
                "entry_price",
                "exit_price",
                "entry_index",
                "exit_index",
                "entry_fee",
                "exit_fee",
                "profit",
                "capital",
                "exit_reason",
            ])
            .map_err(csv_error)?;
        Ok(Self { writer })
    }

    pub fn write_trades(&mut self, variant_name: &str, trades: &[Trade]) -> Result<(), GorkError> {
        for trade in trades {
            self.writer
                .write_record([
                    variant_name.to_string(),
                    trade.entry_time.format(OUTPUT_TIME_FORMAT).to_string(),
                    trade.exit_time.format(OUTPUT_TIME_FORMAT).to_string(),
                    trade.entry_price.to_string(),
                    trade.exit_price.to_string(),
                    trade.entry_index.to_string(),
                    trade.exit_index.to_string(),
                    trade.entry_fee.to_string(),
                    trade.exit_fee.to_string(),
                    trade.profit.to_string(),
                    trade.capital.to_string(),
                    trade.exit_reason.to_string(),
                ])
                .map_err(csv_error)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, GorkError> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| GorkError::Io(std::io::Error::other(e.to_string())))
    }
}

/// Write the trades of every result to `path`, replacing any existing file.
/// Rows are grouped by variant in result order.
pub fn write_trades_csv(path: &Path, results: &[BacktestResult]) -> Result<(), GorkError> {
    let mut log = TradeLogWriter::create(path)?;
    for result in results {
        log.write_trades(&result.variant.to_string(), &result.trades)?;
    }
    log.finish()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> GorkError {
    GorkError::Io(std::io::Error::other(e))
}
