pub mod error;
pub mod command;
pub mod config;
pub mod snapshot;
pub mod store;

// CLI (clap), используется бинарником snapkv
pub mod cli;

// Удобные реэкспорты
pub use command::Command;
pub use config::KvConfig;
pub use error::{KvError, Result};
pub use snapshot::Snapshot;
pub use store::{KvStore, Outcome};
