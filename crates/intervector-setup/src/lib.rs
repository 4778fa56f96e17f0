//! Bootstrap for the intervector store.
//!
//! Loads configuration, describes the command center's fixed collections
//! and seed records, and applies them to a store idempotently.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod bootstrap;
pub mod config;
pub mod directory;
pub mod error;
pub mod plan;

pub use bootstrap::{run, seed, BootstrapReport, Outcome, Phase, SeedEvent, Tally};
pub use config::Config;
pub use error::{SetupError, SetupResult};
pub use plan::SeedPlan;
