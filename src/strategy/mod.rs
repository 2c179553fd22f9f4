// Trading strategy module
pub mod sma_cross;

pub use sma_cross::{signal_from_closes, SmaCrossover};
