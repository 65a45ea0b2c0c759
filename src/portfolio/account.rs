use crate::engine::execution::{Fill, OrderSide};
use crate::portfolio::position::Position;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//final state of a backtest run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSnapshot {
    pub cash: f64,
    pub positions: Vec<Position>,
    pub total_equity: f64,
}

//represents the cash account and position ledger for a run
//mutated only by the execution engine, one fill at a time
#[derive(Debug, Clone)]
pub struct Account {
    //starting cash
    pub initial_cash: f64,

    //current cash (fills and commissions settle here)
    pub cash: f64,

    //current total equity (cash plus holdings at last marked prices)
    pub equity: f64,

    //open positions by symbol, in insertion order
    pub positions: IndexMap<String, Position>,

    //complete fill log
    pub trade_log: Vec<Fill>,
}

impl Account {
    //creates a new account with initial cash
    pub fn new(initial_cash: f64) -> Self {
        Account {
            initial_cash,
            cash: initial_cash,
            equity: initial_cash,
            positions: IndexMap::new(),
            trade_log: Vec::new(),
        }
    }

    //settles a completed fill into cash and the position ledger
    //the execution engine has already verified cash and quantity
    pub fn process_fill(&mut self, fill: Fill) {
        match fill.side {
            OrderSide::Buy => {
                self.cash -= fill.notional + fill.commission;
                let position = self
                    .positions
                    .entry(fill.symbol.clone())
                    .or_insert_with(|| Position::new(fill.symbol.clone()));
                position.apply_buy(fill.qty, fill.price);
            }
            OrderSide::Sell => {
                self.cash += fill.notional - fill.commission;
                if let Some(position) = self.positions.get_mut(&fill.symbol) {
                    position.apply_sell(fill.qty, fill.price);
                    //positions leave the ledger on full exit
                    if position.is_flat() {
                        self.positions.shift_remove(&fill.symbol);
                    }
                }
            }
        }

        self.trade_log.push(fill);
    }

    //marks equity to the given prices: cash plus the market value of every
    //open position; a symbol with no known price falls back to its entry
    pub fn update_equity(&mut self, prices: &IndexMap<String, f64>) {
        let mut holdings = 0.0;
        for (symbol, position) in &self.positions {
            let price = prices
                .get(symbol)
                .copied()
                .unwrap_or(position.avg_entry_price);
            holdings += position.notional_value(price);
        }
        self.equity = self.cash + holdings;
    }

    //returns the position for a symbol, or none if flat
    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    //number of simultaneously open instrument positions
    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    //final snapshot of cash, positions and equity
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            cash: self.cash,
            positions: self.positions.values().cloned().collect(),
            total_equity: self.equity,
        }
    }
}
