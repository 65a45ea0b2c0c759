use crate::config::{ConfigError, RunConfiguration};
use crate::data::{Bar, BarSeries, SeriesError};
use crate::engine::execution::{ExecutionEngine, OrderEvent, OrderSide};
use crate::instrument::Instrument;
use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
use crate::portfolio::{Account, PortfolioSnapshot};
use crate::strategy::{Intent, Strategy, StrategyContext};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use thiserror::Error;

//fatal errors that abort a run before any bar is processed
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(String),
}

//result of a backtest
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub events: Vec<OrderEvent>,
    pub snapshot: PortfolioSnapshot,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: SummaryMetrics,
}

//main backtest engine: a single forward pass over the merged timeline
//of every instrument, one bar at a time, exits before entries
pub struct BacktestEngine {
    config: RunConfiguration,
    instruments: Vec<Instrument>,
    series: IndexMap<String, BarSeries>,
    account: Account,
    execution: ExecutionEngine,
    events: Vec<OrderEvent>,
    equity_history: Vec<(DateTime<Utc>, f64)>,
}

impl BacktestEngine {
    //creates a new engine; configuration and input series are validated
    //here, before any bar is processed
    pub fn new(
        config: RunConfiguration,
        data: Vec<(String, Vec<Bar>)>,
    ) -> Result<Self, BacktestError> {
        config.validate()?;

        let mut instruments = Vec::with_capacity(data.len());
        let mut series = IndexMap::with_capacity(data.len());

        for (symbol, bars) in data {
            if series.contains_key(&symbol) {
                return Err(BacktestError::DuplicateInstrument(symbol));
            }
            instruments.push(Instrument::new(symbol.clone()));
            series.insert(symbol.clone(), BarSeries::new(symbol, bars)?);
        }

        let account = Account::new(config.initial_cash);
        let execution = ExecutionEngine::new(config.commission_rate);

        Ok(BacktestEngine {
            config,
            instruments,
            series,
            account,
            execution,
            events: Vec::new(),
            equity_history: Vec::new(),
        })
    }

    //runs the backtest with the given strategy
    pub fn run(&mut self, strategy: &mut dyn Strategy) -> BacktestResult {
        let symbols: Vec<String> = self.series.keys().cloned().collect();
        strategy.on_start(&symbols);
        tracing::info!(
            strategy = strategy.name(),
            instruments = symbols.len(),
            "backtest started"
        );

        //merged, strictly increasing timeline across all instruments
        let timeline: BTreeSet<DateTime<Utc>> = self
            .series
            .values()
            .flat_map(|s| s.bars().iter().map(|b| b.timestamp))
            .collect();

        //next unconsumed bar index per instrument, in instrument order
        let mut cursors = vec![0usize; self.instruments.len()];
        let mut last_prices: IndexMap<String, f64> = IndexMap::new();

        for ts in timeline {
            //instruments with a bar at this timestamp; the rest are skipped
            //this step, never treated as a zero-price bar
            let mut active: Vec<(usize, usize)> = Vec::new();
            for (i, instrument) in self.instruments.iter().enumerate() {
                let bars = self.series[&instrument.symbol].bars();
                let cursor = cursors[i];
                if cursor < bars.len() && bars[cursor].timestamp == ts {
                    active.push((i, cursor));
                    last_prices.insert(instrument.symbol.clone(), bars[cursor].close);
                    cursors[i] = cursor + 1;
                }
            }

            //exits for all instruments with open positions, then entries,
            //in fixed instrument order; the ordering is observable because
            //exits free cash before entries compete for it
            for &(i, bar_idx) in &active {
                if self
                    .account
                    .get_position(&self.instruments[i].symbol)
                    .is_some()
                {
                    self.step(strategy, i, bar_idx, true);
                }
            }
            for &(i, bar_idx) in &active {
                self.step(strategy, i, bar_idx, false);
            }

            //mark equity at the last known close per instrument
            self.account.update_equity(&last_prices);
            self.equity_history.push((ts, self.account.equity));
        }

        tracing::info!(
            fills = self.account.trade_log.len(),
            final_equity = self.account.equity,
            "backtest finished"
        );

        self.build_result()
    }

    //evaluates one side of the strategy for one instrument at one bar and
    //applies the resulting intent, if any
    fn step(&mut self, strategy: &mut dyn Strategy, i: usize, bar_idx: usize, exit: bool) {
        let instrument = &self.instruments[i];
        let series = &self.series[&instrument.symbol];
        let bars = series.up_to(bar_idx);

        let context = StrategyContext {
            instrument,
            bars,
            position: self.account.get_position(&instrument.symbol),
            cash: self.account.cash,
            equity: self.account.equity,
            open_positions: self.account.open_position_count(),
            pending_order: self.execution.has_outstanding(&instrument.symbol),
            last_bar_of_day: series.is_last_bar_of_day(bar_idx),
            lot_size: self.config.lot_size,
        };

        let intent = if exit {
            strategy.evaluate_exit(&context)
        } else {
            strategy.evaluate_entry(&context)
        };

        if let Some(intent) = intent {
            let symbol = self.instruments[i].symbol.clone();
            let timestamp = bars[bars.len() - 1].timestamp;
            let price = bars[bars.len() - 1].close;
            self.apply_intent(strategy, timestamp, &symbol, price, intent);
        }
    }

    //turns an intent into an order, executes it, and feeds the outcome back
    //to the strategy and the event stream
    fn apply_intent(
        &mut self,
        strategy: &mut dyn Strategy,
        timestamp: DateTime<Utc>,
        symbol: &str,
        price: f64,
        intent: Intent,
    ) {
        let (side, qty) = match intent {
            Intent::Buy { qty } => (OrderSide::Buy, qty),
            Intent::CloseAll => {
                let held = self
                    .account
                    .get_position(symbol)
                    .map(|p| p.qty)
                    .unwrap_or(0);
                if held == 0 {
                    return;
                }
                (OrderSide::Sell, held)
            }
        };

        let event = self
            .execution
            .execute_market(timestamp, symbol, side, qty, price, &mut self.account);
        strategy.on_event(&event);
        self.events.push(event);
    }

    fn build_result(&self) -> BacktestResult {
        let timestamps: Vec<_> = self.equity_history.iter().map(|(t, _)| *t).collect();
        let equity_values: Vec<_> = self.equity_history.iter().map(|(_, e)| *e).collect();

        let equity_curve =
            calculate_equity_curve(&timestamps, &equity_values, self.config.initial_cash);

        let summary = SummaryMetrics::from_backtest(
            &equity_curve,
            &self.account.trade_log,
            self.config.initial_cash,
        );

        BacktestResult {
            events: self.events.clone(),
            snapshot: self.account.snapshot(),
            equity_curve,
            summary,
        }
    }

    //returns a reference to the account
    pub fn account(&self) -> &Account {
        &self.account
    }

    //complete order history for the run
    pub fn order_log(&self) -> &[crate::engine::execution::Order] {
        self.execution.order_log()
    }
}
