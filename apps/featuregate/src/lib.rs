//! # featuregate
//!
//! Command-line front end for featuregate-core over a redb database.

pub mod cli;
pub mod config;
