pub mod listing;

pub use listing::{Board, Instrument};
