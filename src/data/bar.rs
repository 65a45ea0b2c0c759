use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//represents a single ohlcv bar (candlestick) of market data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub symbol: String,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        symbol: String,
    ) -> Result<Self, BarError> {
        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        //validate non-negative volume
        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            symbol,
        })
    }

    //creates a Bar without validation
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        symbol: String,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            symbol,
        }
    }

    //returns the range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    //returns the true range given the previous bar's close
    pub fn true_range(&self, prev_close: f64) -> f64 {
        self.range()
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn valid_bar() {
        let bar = Bar::new(ts(1), 10.0, 10.5, 9.5, 10.2, 1000.0, "600000".into());
        assert!(bar.is_ok());
    }

    #[test]
    fn high_below_low_rejected() {
        let bar = Bar::new(ts(1), 10.0, 9.0, 9.5, 9.2, 1000.0, "600000".into());
        assert!(matches!(bar, Err(BarError::InvalidHighLow { .. })));
    }

    #[test]
    fn close_outside_range_rejected() {
        let bar = Bar::new(ts(1), 10.0, 10.5, 9.5, 11.0, 1000.0, "600000".into());
        assert!(matches!(bar, Err(BarError::InvalidClose { .. })));
    }

    #[test]
    fn open_outside_range_rejected() {
        let bar = Bar::new(ts(1), 8.0, 10.5, 9.5, 10.0, 1000.0, "600000".into());
        assert!(matches!(bar, Err(BarError::InvalidOpen { .. })));
    }

    #[test]
    fn negative_volume_rejected() {
        let bar = Bar::new(ts(1), 10.0, 10.5, 9.5, 10.0, -1.0, "600000".into());
        assert!(matches!(bar, Err(BarError::NegativeVolume(_))));
    }

    #[test]
    fn true_range_uses_previous_close() {
        let bar = Bar::new_unchecked(ts(2), 10.0, 10.5, 9.5, 10.0, 1000.0, "600000".into());
        //gap down: previous close far above the bar range
        assert!((bar.true_range(12.0) - 2.5).abs() < 1e-12);
        //no gap: plain high-low range
        assert!((bar.true_range(10.0) - 1.0).abs() < 1e-12);
    }
}
