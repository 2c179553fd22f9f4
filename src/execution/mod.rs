// Order routing and loop orchestration module
pub mod driver;
pub mod reconciler;

pub use driver::Driver;
pub use reconciler::{ReconcileSummary, Reconciler};
