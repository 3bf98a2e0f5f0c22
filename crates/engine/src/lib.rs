//! Volume-profile engine.
//!
//! This crate handles:
//! - Row layout planning (row size and count for a price range)
//! - Volume binning of chart bars or finer bars into price rows
//! - POC and Value Area analysis
//! - Anchored VWAP with deviation bands
//! - Fingerprint-based caching of computed profiles

pub mod binner;
pub mod cache;
pub mod engine;
pub mod layout;
pub mod profile;
pub mod value_area;
pub mod vwap;

pub use binner::VolumeBinner;
pub use cache::{Fingerprint, LayoutParams, ProfileCache};
pub use engine::{Area, ProfileEngine, ProfileParams, VwapParams};
pub use layout::{RowLayoutPlanner, RowPlan};
pub use profile::{Profile, RangeStats};
pub use value_area::{ProfileAnalyzer, ProfileLevels};
pub use vwap::{AnchoredVwapTracker, Band, VwapPoint, VwapState};
