//! Core types for versionkeep.
//!
//! Configuration, errors and path helpers shared by the transfer and
//! catalog modules.

mod config;
mod error;
pub mod paths;

pub use config::{Config, GeneralConfig, ItemToggles, TransferConfig, SHARED_FOLDER};
pub use error::{KeepError, KeepResult};
