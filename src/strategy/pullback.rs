use crate::strategy::{Intent, Strategy, StrategyContext};

//limit-up pullback pattern over a fixed 4-bar lookback
//looks for a limit-up day three bars back, two days of shrinking volume and
//falling closes, then a reversal up at the current bar; takes profit at a
//fixed target or flattens at the end of the trading day
#[derive(Debug, Clone)]
pub struct PullbackStrategy {
    position_ratio: f64,
    max_positions: usize,
    profit_target: f64,
}

impl PullbackStrategy {
    pub fn new(position_ratio: f64, max_positions: usize, profit_target: f64) -> Self {
        PullbackStrategy {
            position_ratio,
            max_positions,
            profit_target,
        }
    }

    //true when the bar three back closed at its board's limit-up price
    //the reference pre-close is the close four bars back
    fn is_limit_up(&self, ctx: &StrategyContext) -> bool {
        let bars = ctx.bars;
        let n = bars.len();
        let limit = ctx.instrument.limit_up_price(bars[n - 5].close);
        (bars[n - 4].close - limit).abs() <= limit * 0.01
    }
}

impl Strategy for PullbackStrategy {
    fn name(&self) -> &str {
        "Limit-Up Pullback"
    }

    fn evaluate_exit(&mut self, ctx: &StrategyContext) -> Option<Intent> {
        if ctx.pending_order {
            return None;
        }

        let position = ctx.position?;
        if position.qty == 0 {
            return None;
        }

        //profit target first, otherwise flatten at the session close
        if ctx.current().close >= position.avg_entry_price * (1.0 + self.profit_target) {
            return Some(Intent::CloseAll);
        }
        if ctx.last_bar_of_day {
            return Some(Intent::CloseAll);
        }

        None
    }

    fn evaluate_entry(&mut self, ctx: &StrategyContext) -> Option<Intent> {
        if ctx.pending_order {
            return None;
        }

        //portfolio-wide cap on simultaneously open positions
        if ctx.open_positions >= self.max_positions {
            return None;
        }

        //never stack entries on an instrument already held
        if ctx.held_qty() > 0 {
            return None;
        }

        let bars = ctx.bars;
        let n = bars.len();
        if n < 5 {
            return None;
        }

        if !self.is_limit_up(ctx) {
            return None;
        }

        //three-day pullback: shrinking volume and falling closes on the two
        //bars after the limit-up day, then a reversal up today
        let volume_shrinking =
            bars[n - 3].volume < bars[n - 4].volume && bars[n - 2].volume < bars[n - 3].volume;
        let price_falling =
            bars[n - 3].close < bars[n - 4].close && bars[n - 2].close < bars[n - 3].close;
        let reversal_up = bars[n - 1].close > bars[n - 2].close;

        if !(volume_shrinking && price_falling && reversal_up) {
            return None;
        }

        //size by cash budget, floored to whole lots
        let close = ctx.current().close;
        let lot = ctx.lot_size as f64;
        let lots = (self.position_ratio * ctx.cash / close / lot).floor();
        let qty = (lots * lot) as u32;
        if qty == 0 {
            return None;
        }

        Some(Intent::Buy { qty })
    }
}
