//! Rule evaluation for market-intelligence alerts.
//!
//! This crate provides:
//! - `EvalState` — what was last observed and last alerted
//! - three deterministic rule evaluators (market band, high-impact news,
//!   whale net-flow delta)
//! - `AlertEngine` — folds the evaluators over one snapshot per cycle
//!
//! Everything is clocked by the snapshot's `captured_at` timestamp;
//! nothing here performs I/O or reads the wall clock.

pub mod engine;
pub mod evaluators;
pub mod state;

pub use engine::AlertEngine;
pub use state::{Band, EvalState};
