//! Domain types for weekgap

pub mod bar;
pub mod capital;
pub mod gap;
pub mod setup;
pub mod signal;

pub use bar::Bar;
pub use capital::{Capital, CapitalError};
pub use gap::GapResult;
pub use setup::SetupCandidate;
pub use signal::TradeSignal;
