pub mod account;
pub mod position;

pub use account::{Account, PortfolioSnapshot};
pub use position::Position;
