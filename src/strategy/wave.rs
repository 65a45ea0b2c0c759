use crate::engine::execution::{OrderEvent, OrderSide};
use crate::indicators::sma_close;
use crate::strategy::{Intent, Strategy, StrategyContext};
use indexmap::IndexMap;

//per-instrument scratch state for the wave strategy
#[derive(Debug, Clone, Default)]
struct WaveState {
    //price of the last completed buy, cleared on full exit
    last_buy_price: Option<f64>,
}

//sma-turn strategy over a short signal stack
//tracks the signs of the last `stack_len` sma deltas; buys one lot when the
//smoothed series turns up after a decline, closes out on the mirror turn down
#[derive(Debug, Clone)]
pub struct WaveStrategy {
    smoothing_period: usize,
    stack_len: usize,

    state: IndexMap<String, WaveState>,
}

impl WaveStrategy {
    pub fn new(smoothing_period: usize, stack_len: usize) -> Self {
        WaveStrategy {
            smoothing_period,
            stack_len,
            state: IndexMap::new(),
        }
    }

    //signal stack: sign of each of the last `stack_len` sma deltas
    //index 0 is the oldest delta, the last element the newest
    fn signal_stack(&self, ctx: &StrategyContext) -> Option<Vec<i32>> {
        let bars = ctx.bars;
        let end = bars.len() - 1;
        let mut stack = Vec::with_capacity(self.stack_len);

        for i in (1..=self.stack_len).rev() {
            let newer = sma_close(bars, end.checked_sub(i - 1)?, self.smoothing_period)?;
            let older = sma_close(bars, end.checked_sub(i)?, self.smoothing_period)?;
            stack.push(if newer - older > 0.0 { 1 } else { -1 });
        }

        Some(stack)
    }
}

impl Strategy for WaveStrategy {
    fn name(&self) -> &str {
        "SMA Wave"
    }

    fn on_start(&mut self, symbols: &[String]) {
        self.state = symbols
            .iter()
            .map(|s| (s.clone(), WaveState::default()))
            .collect();
    }

    fn evaluate_exit(&mut self, ctx: &StrategyContext) -> Option<Intent> {
        if ctx.pending_order {
            return None;
        }

        if ctx.held_qty() == 0 {
            return None;
        }

        let stack = self.signal_stack(ctx)?;
        let sum: i32 = stack.iter().sum();
        let newest = *stack.last()?;
        let len = self.stack_len as i32;

        //turn down right after a rise
        if newest == -1 && (sum == len - 2 || sum == len - 3) {
            return Some(Intent::CloseAll);
        }

        None
    }

    fn evaluate_entry(&mut self, ctx: &StrategyContext) -> Option<Intent> {
        if ctx.pending_order {
            return None;
        }

        let stack = self.signal_stack(ctx)?;
        let sum: i32 = stack.iter().sum();
        let newest = *stack.last()?;
        let len = self.stack_len as i32;

        //turn up right after a decline
        if !(newest == 1 && (sum == -(len - 2) || sum == -(len - 3))) {
            return None;
        }

        //pyramid only into strength: require the close above the last buy
        let last_buy = self
            .state
            .get(&ctx.instrument.symbol)
            .and_then(|s| s.last_buy_price);
        match last_buy {
            None => Some(Intent::Buy { qty: ctx.lot_size }),
            Some(price) if ctx.current().close > price => Some(Intent::Buy { qty: ctx.lot_size }),
            Some(_) => None,
        }
    }

    fn on_event(&mut self, event: &OrderEvent) {
        if let OrderEvent::Filled(fill) = event {
            if let Some(state) = self.state.get_mut(&fill.symbol) {
                match fill.side {
                    OrderSide::Buy => state.last_buy_price = Some(fill.price),
                    OrderSide::Sell => state.last_buy_price = None,
                }
            }
        }
    }
}
