//! Foundation types for simcli.
//!
//! This crate holds the pieces shared by every simcli crate: the error
//! taxonomy and the runtime configuration with its limit constants.

pub mod config;
pub mod error;
