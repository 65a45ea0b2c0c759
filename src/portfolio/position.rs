use serde::{Deserialize, Serialize};

//represents a long-only holding in a single instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    //instrument symbol
    pub symbol: String,

    //shares held, always >= 0
    pub qty: u32,

    //weighted-average entry price
    pub avg_entry_price: f64,

    //realized pnl from completed sells, gross of commissions
    pub realized_pnl: f64,
}

impl Position {
    //creates a new empty position
    pub fn new(symbol: String) -> Self {
        Position {
            symbol,
            qty: 0,
            avg_entry_price: 0.0,
            realized_pnl: 0.0,
        }
    }

    //returns true when nothing is held
    pub fn is_flat(&self) -> bool {
        self.qty == 0
    }

    //adds shares, re-weighting the average entry price
    pub fn apply_buy(&mut self, qty: u32, price: f64) {
        if qty == 0 {
            return;
        }
        let total_qty = self.qty + qty;
        let total_cost = self.avg_entry_price * self.qty as f64 + price * qty as f64;
        self.avg_entry_price = total_cost / total_qty as f64;
        self.qty = total_qty;
    }

    //removes shares and returns the realized pnl of the closed portion
    //callers must never sell more than is held
    pub fn apply_sell(&mut self, qty: u32, price: f64) -> f64 {
        let close_qty = qty.min(self.qty);
        let realized = (price - self.avg_entry_price) * close_qty as f64;
        self.realized_pnl += realized;
        self.qty -= close_qty;

        if self.qty == 0 {
            self.avg_entry_price = 0.0;
        }

        realized
    }

    //calculates unrealized pnl at a given price
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        (current_price - self.avg_entry_price) * self.qty as f64
    }

    //returns the notional value of the position at a given price
    pub fn notional_value(&self, current_price: f64) -> f64 {
        current_price * self.qty as f64
    }
}
