//! Types library for the simulated market data engine
//!
//! Core data model shared by the engine, the persistence layer, the
//! application shell and the simulation harness.
//!
//! # Modules
//! - `ids`: Identifiers (RowId, ActivityId)
//! - `chart`: Sparkline chart seeds and trend hints
//! - `market`: Live, upcoming and ended market rows
//! - `stat`: Headline stats, sentiment gauge and bottom stats
//! - `activity`: Recent trading activity entries
//! - `errors`: Error taxonomy for model parsing

pub mod ids;
pub mod chart;
pub mod market;
pub mod stat;
pub mod activity;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::activity::*;
    pub use crate::chart::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::market::*;
    pub use crate::stat::*;
}
