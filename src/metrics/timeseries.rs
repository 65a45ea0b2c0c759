use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a point in the equity curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub drawdown: f64,
    pub returns: f64,
}

//calculates the equity curve with running drawdown and per-step returns
pub fn calculate_equity_curve(
    timestamps: &[DateTime<Utc>],
    equity_values: &[f64],
    initial_cash: f64,
) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(timestamps.len());
    let mut peak = initial_cash;
    let mut prev_equity = initial_cash;

    for (&timestamp, &equity) in timestamps.iter().zip(equity_values.iter()) {
        if equity > peak {
            peak = equity;
        }

        let drawdown = if peak > 0.0 { (peak - equity) / peak } else { 0.0 };
        let returns = if prev_equity != 0.0 {
            (equity - prev_equity) / prev_equity
        } else {
            0.0
        };

        curve.push(EquityPoint {
            timestamp,
            equity,
            drawdown,
            returns,
        });
        prev_equity = equity;
    }

    curve
}

//calculates maximum drawdown from an equity curve
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::max)
}

//calculates step-over-step returns from equity values
pub fn calculate_returns(equity_values: &[f64]) -> Vec<f64> {
    equity_values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}
