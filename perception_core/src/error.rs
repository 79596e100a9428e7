//! Errors for the perception core.
//!
//! Scope queries and witness recording never fail; only loading
//! configuration can.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PerceptionError>;

#[derive(Error, Debug)]
pub enum PerceptionError {
    #[error("Invalid perception config: {0}")]
    Config(#[from] toml::de::Error),
}
