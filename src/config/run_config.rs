use crate::strategy::pullback::PullbackStrategy;
use crate::strategy::turtle::TurtleStrategy;
use crate::strategy::wave::WaveStrategy;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid window length for {name}: {value} (must be >= 1)")]
    InvalidWindow { name: &'static str, value: usize },
    #[error("Ratio {name} outside (0, 1]: {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[error("Invalid count for {name}: {value} (must be >= 1)")]
    InvalidCount { name: &'static str, value: usize },
    #[error("Initial cash must be positive: {0}")]
    NonPositiveCash(f64),
    #[error("Commission rate outside [0, 1): {0}")]
    InvalidCommissionRate(f64),
    #[error("Lot size must be >= 1")]
    InvalidLotSize,
}

//breakout strategy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurtleParams {
    pub entry_window: usize,
    pub exit_window: usize,
    pub atr_window: usize,
    pub risk_fraction: f64,
    pub unit_limit: u32,
}

impl Default for TurtleParams {
    fn default() -> Self {
        TurtleParams {
            entry_window: 20,
            exit_window: 10,
            atr_window: 20,
            risk_fraction: 0.02,
            unit_limit: 4,
        }
    }
}

//limit-up pullback strategy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullbackParams {
    pub position_ratio: f64,
    pub max_positions: usize,
    pub profit_target: f64,
}

impl Default for PullbackParams {
    fn default() -> Self {
        PullbackParams {
            position_ratio: 0.3,
            max_positions: 3,
            profit_target: 0.03,
        }
    }
}

//sma wave strategy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveParams {
    pub smoothing_period: usize,
    pub stack_len: usize,
}

impl Default for WaveParams {
    fn default() -> Self {
        WaveParams {
            smoothing_period: 5,
            stack_len: 3,
        }
    }
}

//strategy-specific parameters, selecting the variant for the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyParams {
    Turtle(TurtleParams),
    Pullback(PullbackParams),
    Wave(WaveParams),
}

impl StrategyParams {
    //constructs the strategy variant for these parameters
    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            StrategyParams::Turtle(p) => Box::new(TurtleStrategy::new(
                p.entry_window,
                p.exit_window,
                p.atr_window,
                p.risk_fraction,
                p.unit_limit,
            )),
            StrategyParams::Pullback(p) => Box::new(PullbackStrategy::new(
                p.position_ratio,
                p.max_positions,
                p.profit_target,
            )),
            StrategyParams::Wave(p) => {
                Box::new(WaveStrategy::new(p.smoothing_period, p.stack_len))
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StrategyParams::Turtle(p) => {
                check_window("entry_window", p.entry_window)?;
                check_window("exit_window", p.exit_window)?;
                check_window("atr_window", p.atr_window)?;
                check_ratio("risk_fraction", p.risk_fraction)?;
                if p.unit_limit == 0 {
                    return Err(ConfigError::InvalidCount {
                        name: "unit_limit",
                        value: 0,
                    });
                }
            }
            StrategyParams::Pullback(p) => {
                check_ratio("position_ratio", p.position_ratio)?;
                check_ratio("profit_target", p.profit_target)?;
                if p.max_positions == 0 {
                    return Err(ConfigError::InvalidCount {
                        name: "max_positions",
                        value: 0,
                    });
                }
            }
            StrategyParams::Wave(p) => {
                check_window("smoothing_period", p.smoothing_period)?;
                if p.stack_len < 2 {
                    return Err(ConfigError::InvalidCount {
                        name: "stack_len",
                        value: p.stack_len,
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_window(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidWindow { name, value });
    }
    Ok(())
}

fn check_ratio(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::RatioOutOfRange { name, value });
    }
    Ok(())
}

//complete configuration for a backtest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfiguration {
    //account settings
    pub initial_cash: f64,
    pub commission_rate: f64,
    pub lot_size: u32,

    //strategy
    pub strategy_params: StrategyParams,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            initial_cash: 1_000_000.0,
            commission_rate: 0.001,
            lot_size: 100,
            strategy_params: StrategyParams::Turtle(TurtleParams::default()),
        }
    }
}

impl RunConfiguration {
    //validates the configuration before any bar is processed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_cash <= 0.0 {
            return Err(ConfigError::NonPositiveCash(self.initial_cash));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(ConfigError::InvalidCommissionRate(self.commission_rate));
        }
        if self.lot_size == 0 {
            return Err(ConfigError::InvalidLotSize);
        }
        self.strategy_params.validate()
    }

    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
