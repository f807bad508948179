//! Ground-truth technical indicator calculations.
//!
//! Every function here is a pure fold over an oldest-first candle slice.
//! When the series is too short for an indicator's period the function
//! returns 0 rather than an error; callers treat 0 as "undefined for this
//! window" and must re-check the series length if they need to tell it
//! apart from a genuinely zero value.
//!
//! The formulas are fixed contracts of the benchmark: EMA seeds with the
//! SMA of the *first* `period` closes, RSI and ATR use Wilder's smoothing
//! with factor 1/period, and Bollinger standard deviation uses the
//! population divisor. The scoring tolerance is 0.1%, so any deviation from
//! these exact recurrences shows up as a wrong ranking.

use core_types::{Candle, IndicatorSet};

/// Simple Moving Average of `close` over the trailing `period` candles.
pub fn sma(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period || period == 0 {
        return 0.0;
    }

    let sum: f64 = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close)
        .sum();
    sum / period as f64
}

/// Exponential Moving Average of `close`.
///
/// Seeded with the SMA of the first `period` candles (the oldest window,
/// not the trailing one), then folded forward with
/// `ema = (close - ema) * k + ema` where `k = 2 / (period + 1)`.
pub fn ema(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period || period == 0 {
        return 0.0;
    }

    let seed: f64 = candles[..period].iter().map(|c| c.close).sum();
    let mut ema = seed / period as f64;

    let multiplier = 2.0 / (period as f64 + 1.0);
    for candle in &candles[period..] {
        ema = (candle.close - ema) * multiplier + ema;
    }

    ema
}

/// MACD line: EMA(12) - EMA(26).
pub fn macd(candles: &[Candle]) -> f64 {
    if candles.len() < 26 {
        return 0.0;
    }

    ema(candles, 12) - ema(candles, 26)
}

/// Relative Strength Index using Wilder's smoothing method.
///
/// Requires strictly more than `period` candles because the deltas consume
/// one observation. If no losses are observed the RSI is defined as 100.
pub fn rsi(candles: &[Candle], period: usize) -> f64 {
    if candles.len() <= period || period == 0 {
        return 0.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            gains += change;
        } else {
            losses += -change;
        }
    }

    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;

    // Wilder recurrence: the average receiving no contribution decays
    // toward zero at the same 1/period rate.
    let p = period as f64;
    for i in period + 1..candles.len() {
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            avg_gain = (avg_gain * (p - 1.0) + change) / p;
            avg_loss = (avg_loss * (p - 1.0)) / p;
        } else {
            avg_gain = (avg_gain * (p - 1.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-change)) / p;
        }
    }

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Average True Range using Wilder's smoothing method.
///
/// The true range is undefined for the first candle (no previous close),
/// so the guard is strict: the series must be longer than `period`.
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if candles.len() <= period || period == 0 {
        return 0.0;
    }

    let mut true_ranges = vec![0.0; candles.len()];
    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        true_ranges[i] = tr;
    }

    let seed: f64 = true_ranges[1..=period].iter().sum();
    let mut atr = seed / period as f64;

    let p = period as f64;
    for tr in &true_ranges[period + 1..] {
        atr = (atr * (p - 1.0) + tr) / p;
    }

    atr
}

/// Bollinger Bands as (upper, middle, lower).
///
/// The middle band is the SMA; the standard deviation uses the population
/// divisor (`period`, not `period - 1`). All three bands are 0 when the
/// series is shorter than `period`.
pub fn bollinger(candles: &[Candle], period: usize, multiplier: f64) -> (f64, f64, f64) {
    if candles.len() < period || period == 0 {
        return (0.0, 0.0, 0.0);
    }

    let window = &candles[candles.len() - period..];
    let middle: f64 = window.iter().map(|c| c.close).sum::<f64>() / period as f64;

    let variance: f64 = window
        .iter()
        .map(|c| {
            let diff = c.close - middle;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    let std_dev = variance.sqrt();

    (
        middle + multiplier * std_dev,
        middle,
        middle - multiplier * std_dev,
    )
}

/// Simple Moving Average of `volume` over the trailing `period` candles.
pub fn volume_ma(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period || period == 0 {
        return 0.0;
    }

    let sum: f64 = candles[candles.len() - period..]
        .iter()
        .map(|c| c.volume)
        .sum();
    sum / period as f64
}

/// Computes the full ten-field ground-truth vector with the benchmark's
/// default parameters: MA20, EMA12/EMA26, MACD, RSI14, Bollinger(20, 2.0),
/// ATR14, VolumeMA5. Fields whose guard fails stay at their zero default.
pub fn calculate_all(candles: &[Candle]) -> IndicatorSet {
    let mut result = IndicatorSet::default();

    if candles.len() >= 20 {
        result.ma20 = sma(candles, 20);
    }

    if candles.len() >= 12 {
        result.ema12 = ema(candles, 12);
    }

    if candles.len() >= 26 {
        result.ema26 = ema(candles, 26);
        result.macd = macd(candles);
    }

    if candles.len() > 14 {
        result.rsi14 = rsi(candles, 14);
        result.atr14 = atr(candles, 14);
    }

    if candles.len() >= 20 {
        let (upper, middle, lower) = bollinger(candles, 20, 2.0);
        result.boll_upper = upper;
        result.boll_middle = middle;
        result.boll_lower = lower;
    }

    if candles.len() >= 5 {
        result.volume_ma5 = volume_ma(candles, 5);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: i as i64 * 60_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
                close_time: (i as i64 + 1) * 60_000 - 1,
            })
            .collect()
    }

    #[test]
    fn short_series_returns_sentinel_zero() {
        let candles = candles_from_closes(&[10.0, 11.0, 12.0]);

        assert_eq!(sma(&candles, 5), 0.0);
        assert_eq!(ema(&candles, 5), 0.0);
        assert_eq!(volume_ma(&candles, 5), 0.0);
        assert_eq!(bollinger(&candles, 5, 2.0), (0.0, 0.0, 0.0));

        // RSI and ATR guards are strict: length must exceed the period.
        let exact = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(rsi(&exact, 5), 0.0);
        assert_eq!(atr(&exact, 5), 0.0);
    }

    #[test]
    fn sma_is_mean_of_trailing_window() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // Trailing 3 closes: 4, 5, 6.
        assert_eq!(sma(&candles, 3), 5.0);
    }

    #[test]
    fn ema_of_constant_series_is_the_constant() {
        let candles = candles_from_closes(&[100.0; 15]);
        assert_eq!(ema(&candles, 12), 100.0);
    }

    #[test]
    fn ema_seeds_from_oldest_window() {
        // Seed = SMA of the first 2 closes = 15, then fold 30 and 40 in.
        // k = 2/3: 15 -> (30-15)*2/3+15 = 25 -> (40-25)*2/3+25 = 35.
        let candles = candles_from_closes(&[10.0, 20.0, 30.0, 40.0]);
        let value = ema(&candles, 2);
        assert!((value - 35.0).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn macd_is_ema12_minus_ema26() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        let expected = ema(&candles, 12) - ema(&candles, 26);
        assert_eq!(macd(&candles), expected);
        assert!(macd(&candles) > 0.0);
    }

    #[test]
    fn rsi_is_100_for_monotonic_gains() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        assert_eq!(rsi(&candles, 14), 100.0);
    }

    #[test]
    fn rsi_is_0_for_monotonic_losses() {
        // avg_gain never leaves zero, so rs = 0 and RSI = 100 - 100/1 = 0.
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let candles = candles_from_closes(&closes);
        assert_eq!(rsi(&candles, 14), 0.0);
    }

    #[test]
    fn atr_of_flat_series_is_zero() {
        let candles = candles_from_closes(&[50.0; 20]);
        assert_eq!(atr(&candles, 14), 0.0);
    }

    #[test]
    fn atr_seed_is_mean_of_initial_true_ranges() {
        // Ranges are constant (high - low = 2), so the seed and every
        // smoothed value equal 2.
        let mut candles = candles_from_closes(&[100.0; 20]);
        for c in &mut candles {
            c.high = 101.0;
            c.low = 99.0;
        }
        let value = atr(&candles, 14);
        assert!((value - 2.0).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn bollinger_collapses_on_constant_closes() {
        let candles = candles_from_closes(&[10.0; 5]);
        let (upper, middle, lower) = bollinger(&candles, 5, 2.0);
        assert_eq!(upper, 10.0);
        assert_eq!(middle, 10.0);
        assert_eq!(lower, 10.0);
    }

    #[test]
    fn bollinger_uses_population_divisor() {
        // Closes 1..=4: mean 2.5, population variance 1.25.
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        let (upper, middle, lower) = bollinger(&candles, 4, 2.0);
        let std_dev = 1.25_f64.sqrt();
        assert!((middle - 2.5).abs() < 1e-12);
        assert!((upper - (2.5 + 2.0 * std_dev)).abs() < 1e-12);
        assert!((lower - (2.5 - 2.0 * std_dev)).abs() < 1e-12);
    }

    #[test]
    fn volume_ma_averages_trailing_volumes() {
        let mut candles = candles_from_closes(&[1.0; 6]);
        for (i, c) in candles.iter_mut().enumerate() {
            c.volume = (i + 1) as f64 * 10.0;
        }
        // Trailing 5 volumes: 20, 30, 40, 50, 60.
        assert_eq!(volume_ma(&candles, 5), 40.0);
    }

    #[test]
    fn calculate_all_respects_every_guard() {
        // 20 candles: MA20/BOLL defined, MACD (26) not, RSI/ATR (>14) yes.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        let result = calculate_all(&candles);

        assert!(result.ma20 > 0.0);
        assert!(result.boll_middle > 0.0);
        assert!(result.ema12 > 0.0);
        assert_eq!(result.ema26, 0.0);
        assert_eq!(result.macd, 0.0);
        assert_eq!(result.rsi14, 100.0);
        assert!(result.volume_ma5 > 0.0);
    }

    #[test]
    fn calculate_all_on_full_series_fills_every_field() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let candles = candles_from_closes(&closes);
        let result = calculate_all(&candles);

        for (name, value) in result.fields() {
            if name == "atr14" || name == "macd" {
                continue; // legitimately near zero for this smooth series
            }
            assert!(value != 0.0, "{name} unexpectedly zero");
        }
        assert_eq!(result.boll_middle, sma(&candles, 20));
        assert!(result.boll_upper >= result.boll_middle);
        assert!(result.boll_lower <= result.boll_middle);
    }
}
