pub mod run_config;

pub use run_config::{
    ConfigError, PullbackParams, RunConfiguration, StrategyParams, TurtleParams, WaveParams,
};
