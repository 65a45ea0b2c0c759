use crate::data::Bar;

//rolling-window transforms over bar slices
//every function returns None until the window is fully warmed up, so callers
//can treat "not ready" as "no signal" instead of reading a misleading zero

//highest high over the last `period` bars of the slice
pub fn highest_high(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    bars[bars.len() - period..]
        .iter()
        .map(|b| b.high)
        .fold(None, |acc: Option<f64>, h| match acc {
            Some(max) => Some(max.max(h)),
            None => Some(h),
        })
}

//lowest low over the last `period` bars of the slice
pub fn lowest_low(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    bars[bars.len() - period..]
        .iter()
        .map(|b| b.low)
        .fold(None, |acc: Option<f64>, l| match acc {
            Some(min) => Some(min.min(l)),
            None => Some(l),
        })
}

//average true range over the last `period` bars of the slice
//simple rolling mean of true range; needs one extra bar for the first
//previous close
pub fn atr(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let window = &bars[bars.len() - period - 1..];
    let sum: f64 = window
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .sum();
    Some(sum / period as f64)
}

//simple moving average of the last `period` values of the slice
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sum: f64 = values[values.len() - period..].iter().sum();
    Some(sum / period as f64)
}

//simple moving average of close over the last `period` bars ending at the
//given index (inclusive)
pub fn sma_close(bars: &[Bar], end: usize, period: usize) -> Option<f64> {
    if period == 0 || end + 1 < period || end >= bars.len() {
        return None;
    }
    let closes: Vec<f64> = bars[end + 1 - period..=end].iter().map(|b| b.close).collect();
    sma(&closes, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        ohlc.iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| {
                Bar::new_unchecked(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + chrono::Duration::days(i as i64),
                    o,
                    h,
                    l,
                    c,
                    1000.0,
                    "600000".into(),
                )
            })
            .collect()
    }

    #[test]
    fn channels_not_ready_before_warmup() {
        let data = bars(&[(10.0, 10.5, 9.5, 10.0), (10.0, 10.5, 9.5, 10.0)]);
        assert_eq!(highest_high(&data, 3), None);
        assert_eq!(lowest_low(&data, 3), None);
        assert_eq!(atr(&data, 2), None);
        assert_eq!(sma(&[1.0, 2.0], 3), None);
    }

    #[test]
    fn zero_period_never_ready() {
        let data = bars(&[(10.0, 10.5, 9.5, 10.0)]);
        assert_eq!(highest_high(&data, 0), None);
        assert_eq!(lowest_low(&data, 0), None);
        assert_eq!(atr(&data, 0), None);
        assert_eq!(sma(&[1.0], 0), None);
    }

    #[test]
    fn highest_high_over_window() {
        let data = bars(&[
            (10.0, 12.0, 9.5, 10.0),
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 11.0, 9.5, 10.0),
        ]);
        //window of 2 excludes the 12.0 high of the first bar
        assert_eq!(highest_high(&data, 2), Some(11.0));
        assert_eq!(highest_high(&data, 3), Some(12.0));
    }

    #[test]
    fn lowest_low_over_window() {
        let data = bars(&[
            (10.0, 10.5, 8.0, 10.0),
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 10.5, 9.0, 10.0),
        ]);
        assert_eq!(lowest_low(&data, 2), Some(9.0));
        assert_eq!(lowest_low(&data, 3), Some(8.0));
    }

    #[test]
    fn atr_simple_mean_of_true_range() {
        //constant 1.0 high-low range, no gaps: atr is exactly 1.0
        let data = bars(&[
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 10.5, 9.5, 10.0),
        ]);
        let value = atr(&data, 2).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn atr_includes_gap_in_true_range() {
        //second bar gaps up: true range measured from the previous close
        let data = bars(&[
            (10.0, 10.5, 9.5, 10.0),
            (13.0, 13.5, 12.5, 13.0),
            (13.0, 13.5, 12.5, 13.0),
        ]);
        //tr = |13.5 - 10.0| = 3.5, then 1.0
        let value = atr(&data, 2).unwrap();
        assert!((value - 2.25).abs() < 1e-12);
    }

    #[test]
    fn sma_arithmetic_mean() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 4), Some(2.5));
    }

    #[test]
    fn sma_close_at_index() {
        let data = bars(&[
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 10.5, 9.5, 12.0),
            (10.0, 10.5, 9.5, 14.0),
        ]);
        assert_eq!(sma_close(&data, 2, 2), Some(13.0));
        assert_eq!(sma_close(&data, 1, 2), Some(11.0));
        assert_eq!(sma_close(&data, 0, 2), None);
    }
}
