use chrono::{Datelike, NaiveDate};
use crate::errors::{Result, ScreenerError};

/// Round half to even to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `1234567.891` -> `$1,234,567.89`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

// Dates are stored as YYYYMMDD integers
pub fn naive_date_to_int(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

pub fn int_to_naive_date(date_int: i32) -> Result<NaiveDate> {
    let date_str = date_int.to_string();
    if date_str.len() != 8 {
        return Err(ScreenerError::DataError(format!("Invalid date format: {}", date_str)));
    }

    let year = date_str[0..4].parse::<i32>()?;
    let month = date_str[4..6].parse::<u32>()?;
    let day = date_str[6..8].parse::<u32>()?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ScreenerError::DataError(format!("Invalid date: {}-{}-{}", year, month, day)))
}

/// Arrow IPC storage of daily history, one file per ticker.
pub mod arrow_utils {
    use super::*;
    use crate::models::price::{DailySeries, PricePoint};
    use arrow::record_batch::RecordBatch;
    use arrow_ipc::reader::FileReader;
    use arrow_ipc::writer::FileWriter;
    use arrow_schema::{DataType, Field, Schema};
    use arrow_array::{Array, ArrayRef, Float64Array, Int32Array, Int64Array};
    use log::{debug, info};
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    pub fn daily_schema() -> Schema {
        Schema::new(vec![
            Field::new("date", DataType::Int32, false),
            Field::new("open", DataType::Float64, true),
            Field::new("high", DataType::Float64, true),
            Field::new("low", DataType::Float64, true),
            Field::new("close", DataType::Float64, false),
            Field::new("volume", DataType::Int64, true),
        ])
    }

    pub fn daily_series_to_record_batch(series: &DailySeries) -> Result<RecordBatch> {
        let points = series.points();
        let dates: Vec<i32> = points.iter().map(|p| naive_date_to_int(p.date)).collect();
        let open: Vec<Option<f64>> = points.iter().map(|p| p.open).collect();
        let high: Vec<Option<f64>> = points.iter().map(|p| p.high).collect();
        let low: Vec<Option<f64>> = points.iter().map(|p| p.low).collect();
        let close: Vec<f64> = points.iter().map(|p| p.close).collect();
        let volume: Vec<Option<i64>> = points.iter().map(|p| p.volume).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(dates)),
            Arc::new(Float64Array::from(open)),
            Arc::new(Float64Array::from(high)),
            Arc::new(Float64Array::from(low)),
            Arc::new(Float64Array::from(close)),
            Arc::new(Int64Array::from(volume)),
        ];

        Ok(RecordBatch::try_new(Arc::new(daily_schema()), columns)?)
    }

    fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
        batch
            .column_by_name(name)
            .and_then(|a| a.as_any().downcast_ref::<Float64Array>())
            .ok_or_else(|| ScreenerError::ArrowError(format!("Failed to downcast {} column", name)))
    }

    fn optional(array: &Float64Array, i: usize) -> Option<f64> {
        if array.is_null(i) {
            None
        } else {
            Some(array.value(i))
        }
    }

    pub fn read_daily_series_from_arrow(path: &Path, ticker: &str) -> Result<DailySeries> {
        let file = File::open(path)?;
        let reader = FileReader::try_new(file, None)?;

        let mut points = Vec::new();
        for batch in reader {
            let batch = batch?;

            let dates = batch
                .column_by_name("date")
                .and_then(|a| a.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| ScreenerError::ArrowError("Failed to downcast date column".to_string()))?;
            let open = float_column(&batch, "open")?;
            let high = float_column(&batch, "high")?;
            let low = float_column(&batch, "low")?;
            let close = float_column(&batch, "close")?;
            let volume = batch
                .column_by_name("volume")
                .and_then(|a| a.as_any().downcast_ref::<Int64Array>())
                .ok_or_else(|| ScreenerError::ArrowError("Failed to downcast volume column".to_string()))?;

            for i in 0..batch.num_rows() {
                points.push(PricePoint {
                    date: int_to_naive_date(dates.value(i))?,
                    open: optional(open, i),
                    high: optional(high, i),
                    low: optional(low, i),
                    close: close.value(i),
                    volume: if volume.is_null(i) { None } else { Some(volume.value(i)) },
                });
            }
        }

        debug!("Read {} daily records for {} from {}", points.len(), ticker, path.display());
        DailySeries::new(ticker, points)
    }

    pub fn save_daily_series_to_arrow(series: &DailySeries, path: &Path) -> Result<()> {
        info!(
            "Saving {} daily records for {} to {}",
            series.len(),
            series.ticker(),
            path.display()
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let batch = daily_series_to_record_batch(series)?;
        let file = File::create(path)?;
        let mut writer = FileWriter::try_new(file, &batch.schema())?;
        writer.write(&batch)?;
        writer.finish()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.3333, 2), 33.33);
        assert_eq!(round_to(-0.0456789, 3), -0.046);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(2.125, 2), 2.12);
        assert_eq!(round_to(-2.125, 2), -2.12);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(250.0), "$250.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(-12.5), "-$12.50");
    }

    #[test]
    fn test_date_int_conversion() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        assert_eq!(naive_date_to_int(date), 20240607);
        assert_eq!(int_to_naive_date(20240607).unwrap(), date);
        assert!(int_to_naive_date(2024067).is_err());
        assert!(int_to_naive_date(20241332).is_err());
    }
}
