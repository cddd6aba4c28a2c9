//! Application shell
//!
//! Owns the state the demo pages share and the lifecycle of their feeds:
//!
//! - `state`: `AppContext` (create / use / dispose)
//! - `feeds`: per-page scheduler bundles
//! - `router`: path → page table
//! - `toast`: notification queue
//! - `error`: `ShellError`

pub mod error;
pub mod feeds;
pub mod router;
pub mod state;
pub mod toast;

pub use error::ShellError;
pub use state::AppContext;
