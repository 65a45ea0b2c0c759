use crate::portfolio::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

//order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

//order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Completed,
    Rejected,
    Canceled,
}

impl OrderStatus {
    //returns true once the order can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Rejected | OrderStatus::Canceled
        )
    }
}

//why an order was rejected instead of filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    //buy notional plus commission exceeds available cash
    InsufficientCash,
    //zero quantity, or a sell larger than the held position
    InvalidQuantity,
}

//represents a trading order, owned by the execution engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    pub qty: u32,
    pub status: OrderStatus,
}

//represents a completed fill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fill {
    pub id: u64,
    pub order_id: u64,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    pub qty: u32,
    pub price: f64,
    pub notional: f64,
    pub commission: f64,
}

//notification emitted for every order outcome
//rejections are events, never silent: callers observe them in the stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OrderEvent {
    Filled(Fill),
    Rejected { order: Order, reason: RejectReason },
}

impl OrderEvent {
    pub fn symbol(&self) -> &str {
        match self {
            OrderEvent::Filled(fill) => &fill.symbol,
            OrderEvent::Rejected { order, .. } => &order.symbol,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, OrderEvent::Filled(_))
    }
}

//simulates order execution against the account
//acceptance is immediate and deterministic: an order completes the same bar
//at the bar close unless the cash or quantity check fails
pub struct ExecutionEngine {
    commission_rate: f64,
    next_order_id: u64,
    next_fill_id: u64,
    order_log: Vec<Order>,
}

impl ExecutionEngine {
    pub fn new(commission_rate: f64) -> Self {
        ExecutionEngine {
            commission_rate,
            next_order_id: 1,
            next_fill_id: 1,
            order_log: Vec::new(),
        }
    }

    //runs the full order lifecycle for a market order at the bar close
    //submitted -> accepted -> completed, or rejected with no ledger mutation
    pub fn execute_market(
        &mut self,
        timestamp: DateTime<Utc>,
        symbol: &str,
        side: OrderSide,
        qty: u32,
        price: f64,
        account: &mut Account,
    ) -> OrderEvent {
        let mut order = Order {
            id: self.next_order_id,
            timestamp,
            symbol: symbol.to_string(),
            side,
            qty,
            status: OrderStatus::Submitted,
        };
        self.next_order_id += 1;

        //broker-side acceptance is immediate in this simulator
        order.status = OrderStatus::Accepted;

        //a zero-size order is a programming error, rejected outright
        if qty == 0 {
            return self.reject(order, RejectReason::InvalidQuantity);
        }

        let notional = qty as f64 * price;
        let commission = notional * self.commission_rate;

        match side {
            OrderSide::Buy => {
                //cash check: reject rather than go negative
                if notional + commission > account.cash {
                    return self.reject(order, RejectReason::InsufficientCash);
                }
            }
            OrderSide::Sell => {
                //long-only: never sell more than is held
                let held = account.get_position(symbol).map(|p| p.qty).unwrap_or(0);
                if qty > held {
                    return self.reject(order, RejectReason::InvalidQuantity);
                }
            }
        }

        let fill = Fill {
            id: self.next_fill_id,
            order_id: order.id,
            timestamp,
            symbol: symbol.to_string(),
            side,
            qty,
            price,
            notional,
            commission,
        };
        self.next_fill_id += 1;

        account.process_fill(fill.clone());

        order.status = OrderStatus::Completed;
        debug!(
            symbol,
            ?side,
            qty,
            price,
            notional,
            commission,
            "order filled"
        );
        self.order_log.push(order);

        OrderEvent::Filled(fill)
    }

    fn reject(&mut self, mut order: Order, reason: RejectReason) -> OrderEvent {
        order.status = OrderStatus::Rejected;
        debug!(symbol = %order.symbol, ?reason, qty = order.qty, "order rejected");
        self.order_log.push(order.clone());
        OrderEvent::Rejected { order, reason }
    }

    //true while an order for the symbol is still in flight
    //used as the pending-order guard before evaluating new intents
    pub fn has_outstanding(&self, symbol: &str) -> bool {
        self.order_log
            .iter()
            .any(|o| o.symbol == symbol && !o.status.is_terminal())
    }

    //complete order history for the run, terminal statuses included
    pub fn order_log(&self) -> &[Order] {
        &self.order_log
    }
}
