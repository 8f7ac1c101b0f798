//! Per-station bike inventory over an average day.
//!
//! Trip endpoints become signed stock changes, which are bucketed by
//! time of day, averaged across the month and summed into an expected
//! stock curve per station.

pub mod simulate;
pub mod types;
pub mod utility;

pub use simulate::simulate;
pub use types::{StockChange, StockTable};
