use crate::engine::execution::{Fill, OrderSide};
use crate::metrics::timeseries::{calculate_returns, max_drawdown, EquityPoint};
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_cash: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub num_round_trips: usize,
    pub num_winners: usize,
    pub num_losers: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub total_commission: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from the equity curve and fill log
    pub fn from_backtest(
        equity_curve: &[EquityPoint],
        trades: &[Fill],
        initial_cash: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_cash);

        let total_return = final_equity - initial_cash;
        let total_return_pct = total_return / initial_cash;

        //annualized growth rate over the span of the equity curve
        let cagr = if equity_curve.len() >= 2 {
            let start = equity_curve[0].timestamp;
            let end = equity_curve[equity_curve.len() - 1].timestamp;
            let years = (end - start).num_days() as f64 / 365.25;
            if years > 0.0 {
                (final_equity / initial_cash).powf(1.0 / years) - 1.0
            } else {
                0.0
            }
        } else {
            0.0
        };

        let equity_values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let returns = calculate_returns(&equity_values);

        let round_trips = round_trip_pnls(trades);
        let winners: Vec<f64> = round_trips.iter().filter(|&&p| p > 0.0).copied().collect();
        let losers: Vec<f64> = round_trips.iter().filter(|&&p| p < 0.0).copied().collect();

        let win_rate = if round_trips.is_empty() {
            0.0
        } else {
            winners.len() as f64 / round_trips.len() as f64
        };

        let total_wins: f64 = winners.iter().sum();
        let total_losses: f64 = losers.iter().sum::<f64>().abs();
        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        SummaryMetrics {
            initial_cash,
            final_equity,
            total_return,
            total_return_pct,
            cagr,
            max_drawdown: max_drawdown(equity_curve),
            sharpe_ratio: sharpe_ratio(&returns),
            sortino_ratio: sortino_ratio(&returns),
            num_round_trips: round_trips.len(),
            num_winners: winners.len(),
            num_losers: losers.len(),
            win_rate,
            profit_factor,
            largest_win: winners.iter().fold(0.0f64, |a, &b| a.max(b)),
            largest_loss: losers.iter().fold(0.0f64, |a, &b| a.min(b)),
            total_commission: trades.iter().map(|f| f.commission).sum(),
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Initial Cash", format!("{:.2}", self.initial_cash)),
            ("Final Equity", format!("{:.2}", self.final_equity)),
            (
                "Total Return",
                format!(
                    "{:.2} ({:.2}%)",
                    self.total_return,
                    self.total_return_pct * 100.0
                ),
            ),
            ("CAGR", format!("{:.2}%", self.cagr * 100.0)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Sortino Ratio", format!("{:.3}", self.sortino_ratio)),
            ("Round Trips", format!("{}", self.num_round_trips)),
            ("Win Rate", format!("{:.2}%", self.win_rate * 100.0)),
            ("Profit Factor", format!("{:.3}", self.profit_factor)),
            ("Largest Win", format!("{:.2}", self.largest_win)),
            ("Largest Loss", format!("{:.2}", self.largest_loss)),
            ("Total Commission", format!("{:.2}", self.total_commission)),
        ];
        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table.printstd();
    }
}

//pnl per round trip (entries matched against the closing sell), net of
//commissions, grouped per symbol in fill order
fn round_trip_pnls(trades: &[Fill]) -> Vec<f64> {
    struct OpenLot {
        qty: u32,
        cost: f64,
        commission: f64,
    }

    let mut open: IndexMap<String, OpenLot> = IndexMap::new();
    let mut pnls = Vec::new();

    for fill in trades {
        match fill.side {
            OrderSide::Buy => {
                let lot = open.entry(fill.symbol.clone()).or_insert(OpenLot {
                    qty: 0,
                    cost: 0.0,
                    commission: 0.0,
                });
                lot.qty += fill.qty;
                lot.cost += fill.notional;
                lot.commission += fill.commission;
            }
            OrderSide::Sell => {
                if let Some(lot) = open.get_mut(&fill.symbol) {
                    let close_qty = fill.qty.min(lot.qty) as f64;
                    let avg_entry = if lot.qty > 0 { lot.cost / lot.qty as f64 } else { 0.0 };
                    //entry commission is charged pro rata to the closed share
                    let entry_commission = lot.commission * close_qty / lot.qty as f64;
                    let pnl = (fill.price - avg_entry) * close_qty
                        - entry_commission
                        - fill.commission;
                    pnls.push(pnl);

                    //the rest of the lot keeps its entry basis and the
                    //unallocated part of the entry commission
                    lot.qty -= fill.qty.min(lot.qty);
                    lot.cost -= avg_entry * close_qty;
                    lot.commission -= entry_commission;
                    if lot.qty == 0 {
                        open.shift_remove(&fill.symbol);
                    }
                }
            }
        }
    }

    pnls
}

fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();
    if std_dev == 0.0 || std_dev.is_nan() {
        return 0.0;
    }

    //annualize assuming daily returns
    (mean / std_dev) * (252.0_f64).sqrt()
}

fn sortino_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.mean();
    let negative: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).copied().collect();
    if negative.is_empty() {
        return if mean > 0.0 { f64::INFINITY } else { 0.0 };
    }

    let downside_dev = negative.std_dev();
    if downside_dev == 0.0 || downside_dev.is_nan() {
        return 0.0;
    }

    (mean / downside_dev) * (252.0_f64).sqrt()
}
