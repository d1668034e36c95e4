//! # LORIS-MRI Common Library
//!
//! Shared code for the LORIS-MRI command-line tools including:
//! - Error type and exit-code taxonomy
//! - Profile (credentials + import settings) loading
//! - Database gateway (connection, transactions, `Config` lookups)

pub mod config;
pub mod db;
pub mod error;
pub mod exitcode;

pub use error::{Error, Result};
pub use exitcode::ExitCode;
