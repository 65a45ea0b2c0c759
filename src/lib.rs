//a Rust-based deterministic bar-by-bar backtesting engine for equity trading strategies

pub mod config;
pub mod data;
pub mod engine;
pub mod indicators;
pub mod instrument;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        PullbackParams, RunConfiguration, StrategyParams, TurtleParams, WaveParams,
    };
    pub use crate::data::{Bar, BarSeries};
    pub use crate::engine::{
        BacktestEngine, BacktestError, BacktestResult, ExecutionEngine, Fill, Order, OrderEvent,
        OrderSide, OrderStatus, RejectReason,
    };
    pub use crate::instrument::{Board, Instrument};
    pub use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
    pub use crate::portfolio::{Account, PortfolioSnapshot, Position};
    pub use crate::strategy::{
        pullback::PullbackStrategy, turtle::TurtleStrategy, wave::WaveStrategy, Intent, Strategy,
        StrategyContext,
    };
}
