//! Historical match-day weather for Matchlog
//!
//! Looks up the weather for a match's date and location via the WeatherAPI
//! history endpoint. Results are never cached: every detail display starts a
//! fresh, cancellable `WeatherLookup`.

pub mod lookup;
pub mod provider;
pub mod types;
mod wire;

pub use lookup::{LookupState, WeatherLookup};
pub use provider::{HistoryQuery, WeatherProvider, DEFAULT_HISTORY_URL};
pub use types::*;
