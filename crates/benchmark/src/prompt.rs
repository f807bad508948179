use core_types::Candle;
use std::fmt::Write;

/// Renders the one prompt shared by every backend for a snapshot: the full
/// candle table (oldest first) followed by the ten-field JSON schema the
/// backend must answer with.
///
/// The wording is part of the benchmark contract; every backend receives
/// byte-identical instructions for a given snapshot.
pub fn build_indicator_prompt(candles: &[Candle]) -> String {
    let mut prompt = String::new();

    prompt.push_str("Below is the K-line (candlestick) data sorted from oldest to newest:\n");
    prompt.push_str("Index | Open | High | Low | Close | Volume\n");
    prompt.push_str("------|------|------|-----|-------|--------\n");

    for (i, c) in candles.iter().enumerate() {
        // Infallible for String targets.
        let _ = writeln!(
            prompt,
            "{} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2}",
            i + 1,
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        );
    }

    let _ = write!(
        prompt,
        r#"
Based on the {} candlesticks above, calculate the following technical indicators using standard algorithms:

1. MA20 (20-period Simple Moving Average)
2. EMA12 (12-period Exponential Moving Average)
3. EMA26 (26-period Exponential Moving Average)
4. MACD (EMA12 - EMA26)
5. RSI14 (14-period Relative Strength Index, using Wilder's smoothing method)
6. Bollinger Bands (20-period, 2 standard deviations): upper, middle, lower
7. ATR14 (14-period Average True Range, using Wilder's smoothing method)
8. VolumeMA5 (5-period Volume Moving Average)

Return ONLY a JSON object in the following format, with no additional text:
{{
  "ma20": number,
  "ema12": number,
  "ema26": number,
  "macd": number,
  "rsi14": number,
  "boll_upper": number,
  "boll_middle": number,
  "boll_lower": number,
  "atr14": number,
  "volume_ma5": number
}}

Requirements:
- Round all values to 2 decimal places
- For EMA, use SMA as initial value with multiplier = 2/(period+1)
- For RSI, use Wilder's smoothing method
- Return ONLY the JSON object, no explanations"#,
        candles.len()
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::INDICATOR_NAMES;

    fn sample_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                open_time: i as i64,
                open: 100.0,
                high: 101.5,
                low: 99.25,
                close: 100.75,
                volume: 1234.5,
                close_time: i as i64 + 1,
            })
            .collect()
    }

    #[test]
    fn prompt_lists_every_candle_with_two_decimals() {
        let prompt = build_indicator_prompt(&sample_candles(50));

        assert!(prompt.contains("sorted from oldest to newest"));
        assert!(prompt.contains("1 | 100.00 | 101.50 | 99.25 | 100.75 | 1234.50"));
        assert!(prompt.contains("50 | 100.00"));
        assert!(prompt.contains("Based on the 50 candlesticks above"));
    }

    #[test]
    fn prompt_spells_out_the_full_response_schema() {
        let prompt = build_indicator_prompt(&sample_candles(30));
        for name in INDICATOR_NAMES {
            assert!(prompt.contains(&format!("\"{name}\"")), "{name} missing");
        }
        assert!(prompt.contains("Return ONLY the JSON object"));
    }
}
