//! Shared types for the chain adapter workspace.
//!
//! Everything the adapters exchange with their callers and collaborators
//! lives here: the chain identifier, request and response shapes, the error
//! taxonomy, and the interfaces of the wallet, data providers, fee oracles
//! and coin selection strategy.

pub mod bitcoin;
pub mod chains;
pub mod coin_select;
pub mod common;
pub mod configs;
pub mod errors;
pub mod ethereum;
pub mod fees;
pub mod providers;
pub mod wallet;

pub use chains::*;
pub use coin_select::*;
pub use common::*;
pub use errors::*;
pub use fees::*;
pub use providers::*;
pub use wallet::*;
