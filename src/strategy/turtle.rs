use crate::engine::execution::{OrderEvent, OrderSide};
use crate::indicators::{atr, highest_high, lowest_low};
use crate::strategy::{Intent, Strategy, StrategyContext};
use indexmap::IndexMap;

//per-instrument scratch state for the breakout strategy
#[derive(Debug, Clone, Default)]
struct TurtleState {
    //number of units currently scaled into, within [0, unit_limit]
    unit_count: u32,
}

//breakout entry with volatility-sized unit scaling
//adds a unit when the close breaks the entry channel of the previous bar,
//closes the full position when the close falls below the exit channel
#[derive(Debug, Clone)]
pub struct TurtleStrategy {
    entry_window: usize,
    exit_window: usize,
    atr_window: usize,
    risk_fraction: f64,
    unit_limit: u32,

    //state table keyed by symbol, initialized once per run
    state: IndexMap<String, TurtleState>,
}

impl TurtleStrategy {
    pub fn new(
        entry_window: usize,
        exit_window: usize,
        atr_window: usize,
        risk_fraction: f64,
        unit_limit: u32,
    ) -> Self {
        TurtleStrategy {
            entry_window,
            exit_window,
            atr_window,
            risk_fraction,
            unit_limit,
            state: IndexMap::new(),
        }
    }

    //one unit sized by risk budget over current volatility
    fn unit_size(&self, equity: f64, atr_value: f64) -> u32 {
        if atr_value <= 0.0 {
            return 0;
        }
        let size = (self.risk_fraction * equity / atr_value).floor();
        if size <= 0.0 {
            0
        } else {
            size as u32
        }
    }
}

impl Strategy for TurtleStrategy {
    fn name(&self) -> &str {
        "Turtle Breakout"
    }

    fn on_start(&mut self, symbols: &[String]) {
        self.state = symbols
            .iter()
            .map(|s| (s.clone(), TurtleState::default()))
            .collect();
    }

    fn evaluate_exit(&mut self, ctx: &StrategyContext) -> Option<Intent> {
        //no new intent while an order is outstanding
        if ctx.pending_order {
            return None;
        }

        if ctx.held_qty() == 0 {
            return None;
        }

        //exit channel through the previous bar, never the current one
        let exit_channel = lowest_low(ctx.history(), self.exit_window)?;
        if ctx.current().close < exit_channel {
            return Some(Intent::CloseAll);
        }

        None
    }

    fn evaluate_entry(&mut self, ctx: &StrategyContext) -> Option<Intent> {
        if ctx.pending_order {
            return None;
        }

        let unit_count = self
            .state
            .get(&ctx.instrument.symbol)
            .map(|s| s.unit_count)
            .unwrap_or(0);
        if unit_count >= self.unit_limit {
            return None;
        }

        //entry channel through the previous bar
        let entry_channel = highest_high(ctx.history(), self.entry_window)?;
        if ctx.current().close <= entry_channel {
            return None;
        }

        let atr_value = atr(ctx.bars, self.atr_window)?;
        let qty = self.unit_size(ctx.equity, atr_value);
        if qty == 0 {
            return None;
        }

        Some(Intent::Buy { qty })
    }

    fn on_event(&mut self, event: &OrderEvent) {
        //unit count follows completed fills only, so a rejected order can
        //never advance the scale-in count
        if let OrderEvent::Filled(fill) = event {
            if let Some(state) = self.state.get_mut(&fill.symbol) {
                match fill.side {
                    OrderSide::Buy => state.unit_count += 1,
                    OrderSide::Sell => state.unit_count = 0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Bar;
    use crate::engine::execution::Fill;
    use crate::instrument::Instrument;
    use crate::portfolio::Position;
    use chrono::{Duration, TimeZone, Utc};

    fn flat_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                Bar::new_unchecked(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + Duration::days(i as i64),
                    10.0,
                    10.5,
                    9.5,
                    10.0,
                    1000.0,
                    "600000".into(),
                )
            })
            .collect()
    }

    fn ctx<'a>(
        instrument: &'a Instrument,
        bars: &'a [Bar],
        position: Option<&'a Position>,
        equity: f64,
    ) -> StrategyContext<'a> {
        StrategyContext {
            instrument,
            bars,
            position,
            cash: equity,
            equity,
            open_positions: usize::from(position.is_some()),
            pending_order: false,
            last_bar_of_day: true,
            lot_size: 100,
        }
    }

    fn started_strategy() -> TurtleStrategy {
        let mut strategy = TurtleStrategy::new(20, 10, 20, 0.02, 4);
        strategy.on_start(&["600000".to_string()]);
        strategy
    }

    fn buy_fill(qty: u32) -> OrderEvent {
        OrderEvent::Filled(Fill {
            id: 1,
            order_id: 1,
            timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            symbol: "600000".into(),
            side: OrderSide::Buy,
            qty,
            price: 11.4,
            notional: qty as f64 * 11.4,
            commission: 0.0,
        })
    }

    #[test]
    fn no_signal_before_warmup() {
        let mut strategy = started_strategy();
        let instrument = Instrument::new("600000".into());
        let bars = flat_bars(10);
        assert_eq!(strategy.evaluate_entry(&ctx(&instrument, &bars, None, 100_000.0)), None);
    }

    #[test]
    fn breakout_emits_unit_buy() {
        let mut strategy = started_strategy();
        let instrument = Instrument::new("600000".into());
        let mut bars = flat_bars(25);
        //close clears the 20-bar high of 10.5
        bars.push(Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            10.2,
            11.5,
            10.0,
            11.4,
            1500.0,
            "600000".into(),
        ));

        let intent = strategy.evaluate_entry(&ctx(&instrument, &bars, None, 100_000.0));
        //atr: 19 bars of tr 1.0 plus the breakout bar tr 1.5 -> 1.025
        let expected = (0.02_f64 * 100_000.0 / 1.025).floor() as u32;
        assert_eq!(intent, Some(Intent::Buy { qty: expected }));
    }

    #[test]
    fn close_at_channel_is_not_a_breakout() {
        let mut strategy = started_strategy();
        let instrument = Instrument::new("600000".into());
        let mut bars = flat_bars(25);
        //close exactly at the channel must not trigger
        bars.push(Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            10.2,
            10.5,
            10.0,
            10.5,
            1500.0,
            "600000".into(),
        ));

        assert_eq!(
            strategy.evaluate_entry(&ctx(&instrument, &bars, None, 100_000.0)),
            None
        );
    }

    #[test]
    fn unit_limit_caps_entries() {
        let mut strategy = started_strategy();
        for _ in 0..4 {
            strategy.on_event(&buy_fill(100));
        }

        let instrument = Instrument::new("600000".into());
        let mut bars = flat_bars(25);
        bars.push(Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            10.2,
            11.5,
            10.0,
            11.4,
            1500.0,
            "600000".into(),
        ));

        assert_eq!(
            strategy.evaluate_entry(&ctx(&instrument, &bars, None, 100_000.0)),
            None
        );
    }

    #[test]
    fn breakdown_closes_full_position() {
        let mut strategy = started_strategy();
        strategy.on_event(&buy_fill(100));

        let instrument = Instrument::new("600000".into());
        let mut bars = flat_bars(25);
        //close falls below the 10-bar low of 9.5
        bars.push(Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            9.4,
            9.5,
            9.0,
            9.1,
            1500.0,
            "600000".into(),
        ));

        let mut position = Position::new("600000".into());
        position.apply_buy(100, 11.4);

        let intent = strategy.evaluate_exit(&ctx(&instrument, &bars, Some(&position), 100_000.0));
        assert_eq!(intent, Some(Intent::CloseAll));
    }

    #[test]
    fn sell_fill_resets_unit_count() {
        let mut strategy = started_strategy();
        strategy.on_event(&buy_fill(100));
        strategy.on_event(&buy_fill(100));

        strategy.on_event(&OrderEvent::Filled(Fill {
            id: 3,
            order_id: 3,
            timestamp: Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap(),
            symbol: "600000".into(),
            side: OrderSide::Sell,
            qty: 200,
            price: 9.1,
            notional: 1820.0,
            commission: 0.0,
        }));

        assert_eq!(strategy.state["600000"].unit_count, 0);
    }

    #[test]
    fn pending_order_blocks_evaluation() {
        let mut strategy = started_strategy();
        let instrument = Instrument::new("600000".into());
        let mut bars = flat_bars(25);
        bars.push(Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            10.2,
            11.5,
            10.0,
            11.4,
            1500.0,
            "600000".into(),
        ));

        let mut context = ctx(&instrument, &bars, None, 100_000.0);
        context.pending_order = true;
        assert_eq!(strategy.evaluate_entry(&context), None);
    }

    #[test]
    fn unit_size_guards_degenerate_volatility() {
        let strategy = started_strategy();
        //zero or negative volatility must never divide into a size
        assert_eq!(strategy.unit_size(100_000.0, 0.0), 0);
        assert_eq!(strategy.unit_size(100_000.0, -1.0), 0);
        //tiny equity floors to zero shares
        assert_eq!(strategy.unit_size(10.0, 1.0), 0);
        assert_eq!(strategy.unit_size(100_000.0, 1.025), 1951);
    }
}
