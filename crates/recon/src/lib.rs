//! `padconv-recon`: carry-forward ledger and annual movement report.
//!
//! Pure engine crate: receives classified record sets, returns typed rows and
//! tables. No filesystem access.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod model;
pub mod movement;
pub mod restos;

#[cfg(test)]
mod test_support;

pub use config::{KeyColumns, ReconConfig, SourceConfig};
pub use engine::{run, ReconInput, MOVEMENT_TABLE, RESTOS_TABLE};
pub use error::ReconError;
pub use model::{
    Balances, CommitmentKey, DataQualityWarning, MovementRow, MovementTotals, ReconResult, ReconSummary, RestosRow,
};
