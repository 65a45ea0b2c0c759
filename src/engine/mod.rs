pub mod backtest;
pub mod execution;

pub use backtest::{BacktestEngine, BacktestError, BacktestResult};
pub use execution::{
    ExecutionEngine, Fill, Order, OrderEvent, OrderSide, OrderStatus, RejectReason,
};
