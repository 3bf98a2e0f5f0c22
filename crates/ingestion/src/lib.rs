//! Bar data plumbing for the volume-profile engine.
//!
//! This crate handles:
//! - In-memory sparse bar series (the bar source the engine reads from)
//! - Trade aggregation into finer bars (second/minute/tick)
//! - Tick-rule direction classification of fine bars

pub mod bar_builder;
pub mod classifier;
pub mod series;

pub use bar_builder::BarBuilder;
pub use classifier::{ClassificationStats, TickRuleClassifier};
pub use series::BarSeries;
