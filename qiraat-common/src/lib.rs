//! # Qiraat Common Library
//!
//! Shared code for the qiraat identification services:
//! - Wire types exchanged with the classification endpoint
//! - Prediction, outcome and history model
//! - Configuration loading
//! - Timestamp utilities

pub mod api;
pub mod config;
pub mod error;
pub mod prediction;
pub mod time;

pub use error::{Error, Result};
pub use prediction::{percent, History, Outcome, OutcomeRecord, Prediction, HISTORY_LIMIT};
