//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod enriched;
pub mod position;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod split;
pub mod config_validation;
pub mod error;
