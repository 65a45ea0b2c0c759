pub mod pullback;
pub mod turtle;
pub mod wave;

use crate::data::Bar;
use crate::engine::execution::OrderEvent;
use crate::instrument::Instrument;
use crate::portfolio::Position;

//a trading intent for the instrument under evaluation
//sizing is decided by the strategy; the driver turns intents into orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    //buy the given number of shares at the bar close
    Buy { qty: u32 },
    //close the full open position at the bar close
    CloseAll,
}

//per-bar, per-instrument view handed to a strategy for evaluation
//bars run up to and including the current bar; channel-style indicators are
//computed over history() so the current bar never triggers its own breakout
pub struct StrategyContext<'a> {
    pub instrument: &'a Instrument,
    pub bars: &'a [Bar],
    pub position: Option<&'a Position>,
    pub cash: f64,
    pub equity: f64,
    pub open_positions: usize,
    pub pending_order: bool,
    pub last_bar_of_day: bool,
    pub lot_size: u32,
}

impl<'a> StrategyContext<'a> {
    //the bar being evaluated
    pub fn current(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    //all bars strictly before the current one
    pub fn history(&self) -> &[Bar] {
        &self.bars[..self.bars.len() - 1]
    }

    //shares currently held in this instrument
    pub fn held_qty(&self) -> u32 {
        self.position.map(|p| p.qty).unwrap_or(0)
    }
}

//strategy interface: a pure per-bar evaluation from market view to intent
//exits are evaluated for every instrument before any entry in the same bar
pub trait Strategy: Send {
    //returns the strategy name
    fn name(&self) -> &str;

    //called once before the first bar with the instrument universe
    fn on_start(&mut self, _symbols: &[String]) {}

    //evaluates the exit side for one instrument at the current bar
    fn evaluate_exit(&mut self, ctx: &StrategyContext) -> Option<Intent>;

    //evaluates the entry side for one instrument at the current bar
    fn evaluate_entry(&mut self, ctx: &StrategyContext) -> Option<Intent>;

    //receives every order outcome so strategy state can track fills
    fn on_event(&mut self, _event: &OrderEvent) {}
}
