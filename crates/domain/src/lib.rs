//! Domain-level building blocks shared by the relay binary: the transaction
//! snapshot model, environment-driven configuration, and telemetry wiring.

pub mod config;
pub mod model;
pub mod services;

pub use config::{ConfigError, RelayConfig};
pub use model::{ChainHeight, RawTransaction, Transaction, TransactionSnapshot};
