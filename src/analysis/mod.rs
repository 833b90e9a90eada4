//! Analysis modules.
//!
//! Scoring and aggregation of comment sentiment.

pub mod aggregator;

pub use aggregator::*;
