//! Core types and configuration for the volume-profile engine.
//!
//! This crate provides shared types used across all other crates:
//! - Market data types (bars, trades, symbol info)
//! - Profile types (price bins, layout and anchor settings)
//! - Configuration structures
//! - Collaborator traits (bar source, session calendar)
//! - Common error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use calendar::FixedOffsetCalendar;
pub use config::Config;
pub use error::{Error, Result};
pub use source::{BarRangeSource, SessionCalendar};
pub use types::*;
