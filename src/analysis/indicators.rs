//! Technical indicators over daily closes.
//!
//! Every smoothing follows the recursive form `y[0] = x[0]`,
//! `y[t] = (1 - alpha) * y[t-1] + alpha * x[t]` without bias correction, and only
//! the value for the most recent bar is reported.

use serde::Serialize;

use crate::errors::{Result, ScreenerError};
use crate::util::round_to;

pub const RSI_WINDOW: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_K: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bollinger_upper: f64,
    pub bollinger_middle: f64,
    pub bollinger_lower: f64,
    /// `None` until 50 closes are available.
    pub sma_50: Option<f64>,
    /// `None` until 200 closes are available.
    pub sma_200: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Exponentially weighted mean with the given smoothing factor, seeded with the first value.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for (i, x) in values.iter().enumerate() {
        let y = if i == 0 { *x } else { (1.0 - alpha) * out[i - 1] + alpha * x };
        out.push(y);
    }
    out
}

/// EMA with `alpha = 2 / (span + 1)`.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    ewm(values, 2.0 / (span as f64 + 1.0))
}

/// Mean of the trailing `window` closes, if there are that many.
pub fn trailing_sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Wilder RSI of the last bar. A zero average loss reads as 100.
pub fn rsi(closes: &[f64], window: usize) -> Result<f64> {
    if closes.len() < 2 || window == 0 {
        return Err(ScreenerError::InsufficientData(format!(
            "RSI needs at least 2 closes, got {}",
            closes.len()
        )));
    }

    // first bar has no prior close and contributes neither gain nor loss
    let mut gains = vec![0.0];
    let mut losses = vec![0.0];
    for pair in closes.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let alpha = 1.0 / window as f64;
    let avg_gain = *ewm(&gains, alpha).last().unwrap_or(&0.0);
    let avg_loss = *ewm(&losses, alpha).last().unwrap_or(&0.0);

    if avg_loss == 0.0 {
        return Ok(100.0);
    }
    let rs = avg_gain / avg_loss;
    Ok(round_to(100.0 - 100.0 / (1.0 + rs), 2))
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Macd> {
    if closes.is_empty() {
        return Err(ScreenerError::InsufficientData("MACD needs closes".to_string()));
    }

    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, signal);

    let last_line = line[line.len() - 1];
    let last_signal = signal_line[signal_line.len() - 1];
    Ok(Macd {
        line: round_to(last_line, 3),
        signal: round_to(last_signal, 3),
        histogram: round_to(last_line - last_signal, 3),
    })
}

pub fn bollinger(closes: &[f64], window: usize, k: f64) -> Result<BollingerBands> {
    let middle = trailing_sma(closes, window).ok_or_else(|| {
        ScreenerError::InsufficientData(format!(
            "Bollinger bands need {} closes, got {}",
            window,
            closes.len()
        ))
    })?;

    let tail = &closes[closes.len() - window..];
    let variance = tail.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / window as f64;
    let std_dev = variance.sqrt();

    Ok(BollingerBands {
        upper: round_to(middle + k * std_dev, 2),
        middle: round_to(middle, 2),
        lower: round_to(middle - k * std_dev, 2),
    })
}

pub fn compute_indicators(closes: &[f64]) -> Result<IndicatorSet> {
    let rsi = rsi(closes, RSI_WINDOW)?;
    let macd = macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;
    let bands = bollinger(closes, BOLLINGER_WINDOW, BOLLINGER_K)?;

    Ok(IndicatorSet {
        rsi,
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        bollinger_upper: bands.upper,
        bollinger_middle: bands.middle,
        bollinger_lower: bands.lower,
        sma_50: trailing_sma(closes, 50).map(|v| round_to(v, 2)),
        sma_200: trailing_sma(closes, 200).map(|v| round_to(v, 2)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 50.0 + 10.0 * ((i as f64) * 0.3).sin()).collect()
    }

    #[test]
    fn test_ewm_seeded_with_first_value() {
        let out = ewm(&[10.0, 20.0, 20.0], 0.5);
        assert_eq!(out, vec![10.0, 15.0, 17.5]);
    }

    #[test]
    fn test_trailing_sma() {
        let closes = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        assert_eq!(trailing_sma(&closes, 3), Some(14.0));
        assert_eq!(trailing_sma(&closes, 7), None);
    }

    #[test]
    fn test_rsi_known_value() {
        // gains [0, 1, 0], losses [0, 0, 1], alpha = 1/2
        // avg_gain: 0 -> 0.5 -> 0.25, avg_loss: 0 -> 0 -> 0.5, rs = 0.5
        let value = rsi(&[10.0, 11.0, 10.0], 2).unwrap();
        assert_eq!(value, 33.33);
    }

    #[test]
    fn test_rsi_without_losses_is_100() {
        let rising: Vec<f64> = (1..30).map(|i| i as f64).collect();
        assert_eq!(rsi(&rising, RSI_WINDOW).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_bounded() {
        for closes in [wave(300), (1..40).rev().map(|i| i as f64).collect::<Vec<_>>()] {
            let value = rsi(&closes, RSI_WINDOW).unwrap();
            assert!((0.0..=100.0).contains(&value), "rsi out of range: {}", value);
        }
        assert!(rsi(&[5.0], RSI_WINDOW).is_err());
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let m = macd(&[42.0; 40], MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();
        assert_eq!(m.line, 0.0);
        assert_eq!(m.signal, 0.0);
        assert_eq!(m.histogram, 0.0);
    }

    #[test]
    fn test_macd_two_points() {
        // fast alpha 2/13, slow alpha 2/27; line[1] = 10*(2/13 - 2/27) = 0.79772...
        // signal[1] = 0.2 * line[1]
        let m = macd(&[100.0, 110.0], MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();
        assert_eq!(m.line, 0.798);
        assert_eq!(m.signal, 0.160);
        assert_eq!(m.histogram, 0.638);
    }

    #[test]
    fn test_bollinger_population_std() {
        let mut closes = vec![1.0; 10];
        closes.extend(vec![3.0; 10]);
        // mean 2, population std 1
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        assert_eq!(bands.middle, 2.0);
        assert_eq!(bands.upper, 4.0);
        assert_eq!(bands.lower, 0.0);

        assert!(matches!(
            bollinger(&closes[..19], 20, 2.0),
            Err(ScreenerError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_moving_averages_missing_until_window_filled() {
        let set = compute_indicators(&wave(120)).unwrap();
        assert!(set.sma_50.is_some());
        assert!(set.sma_200.is_none());
        assert!(set.bollinger_upper >= set.bollinger_middle);
        assert!(set.bollinger_middle >= set.bollinger_lower);
    }
}
