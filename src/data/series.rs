use crate::data::bar::Bar;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Empty bar series for {0}")]
    Empty(String),
    #[error("Non-monotonic timestamp in {symbol} at index {index}: {current} <= {previous}")]
    NonMonotonicTimestamp {
        symbol: String,
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

//ordered, time-indexed bar sequence for a single instrument
//read-only once constructed; timestamps are strictly increasing
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    //creates a series, rejecting empty input and out-of-order timestamps
    pub fn new(symbol: String, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty(symbol));
        }

        for i in 1..bars.len() {
            if bars[i].timestamp <= bars[i - 1].timestamp {
                return Err(SeriesError::NonMonotonicTimestamp {
                    symbol,
                    index: i,
                    previous: bars[i - 1].timestamp,
                    current: bars[i].timestamp,
                });
            }
        }

        Ok(BarSeries { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    //returns all bars up to and including index i
    pub fn up_to(&self, i: usize) -> &[Bar] {
        &self.bars[..=i]
    }

    //true when the bar at index i is the last bar of its calendar day
    //with daily bars this holds for every index
    pub fn is_last_bar_of_day(&self, i: usize) -> bool {
        match self.bars.get(i + 1) {
            Some(next) => next.timestamp.date_naive() != self.bars[i].timestamp.date_naive(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar_at(day: u32, hour: u32) -> Bar {
        Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            10.0,
            10.5,
            9.5,
            10.0,
            1000.0,
            "600000".into(),
        )
    }

    #[test]
    fn ordered_series_accepted() {
        let series = BarSeries::new("600000".into(), vec![bar_at(1, 15), bar_at(2, 15)]);
        assert_eq!(series.unwrap().len(), 2);
    }

    #[test]
    fn empty_series_rejected() {
        let series = BarSeries::new("600000".into(), vec![]);
        assert!(matches!(series, Err(SeriesError::Empty(_))));
    }

    #[test]
    fn out_of_order_series_rejected() {
        let series = BarSeries::new("600000".into(), vec![bar_at(2, 15), bar_at(1, 15)]);
        assert!(matches!(
            series,
            Err(SeriesError::NonMonotonicTimestamp { index: 1, .. })
        ));
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let series = BarSeries::new("600000".into(), vec![bar_at(1, 15), bar_at(1, 15)]);
        assert!(matches!(
            series,
            Err(SeriesError::NonMonotonicTimestamp { .. })
        ));
    }

    #[test]
    fn last_bar_of_day_detection() {
        let series = BarSeries::new(
            "600000".into(),
            vec![bar_at(1, 10), bar_at(1, 15), bar_at(2, 15)],
        )
        .unwrap();
        assert!(!series.is_last_bar_of_day(0));
        assert!(series.is_last_bar_of_day(1));
        assert!(series.is_last_bar_of_day(2));
    }
}
