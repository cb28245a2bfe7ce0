use chrono::NaiveDate;
use log::{info, warn};
use std::io::Read;
use std::path::Path;

use crate::errors::{Result, ScreenerError};
use crate::models::price::{DailySeries, PricePoint};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // timestamps like "2024-06-03 00:00:00-04:00" keep their date part
    let raw = raw.trim().split_whitespace().next().unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Read a `Date,Open,High,Low,Close,[Adj Close],Volume` export. Header names are matched
/// case-insensitively; rows whose date or close cannot be read are skipped.
pub fn read_daily_csv<R: Read>(reader: R, ticker: &str) -> Result<DailySeries> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let date_idx = column("date")
        .or_else(|| column("price"))
        .ok_or_else(|| ScreenerError::DataError("CSV has no Date column".to_string()))?;
    let close_idx = column("close")
        .ok_or_else(|| ScreenerError::DataError("CSV has no Close column".to_string()))?;
    let open_idx = column("open");
    let high_idx = column("high");
    let low_idx = column("low");
    let volume_idx = column("volume");

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let date = record.get(date_idx).and_then(parse_date);
        let close = parse_number(record.get(close_idx));

        let (date, close) = match (date, close) {
            (Some(d), Some(c)) if c > 0.0 => (d, c),
            _ => {
                skipped += 1;
                continue;
            }
        };

        points.push(PricePoint {
            date,
            open: open_idx.and_then(|i| parse_number(record.get(i))),
            high: high_idx.and_then(|i| parse_number(record.get(i))),
            low: low_idx.and_then(|i| parse_number(record.get(i))),
            close,
            volume: volume_idx
                .and_then(|i| parse_number(record.get(i)))
                .map(|v| v as i64),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} unreadable rows while importing {}", skipped, ticker);
    }
    info!("Imported {} daily records for {}", points.len(), ticker);
    DailySeries::new(ticker, points)
}

pub fn import_daily_csv(path: &Path, ticker: &str) -> Result<DailySeries> {
    let file = std::fs::File::open(path)?;
    read_daily_csv(file, ticker)
}
