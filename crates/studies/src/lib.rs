//! Chart studies built on the volume-profile engine.
//!
//! Each study only decides which bar range a profile covers and when a new
//! one starts. All computation is delegated to `profile-engine`.

pub mod composite;
pub mod indicator;
pub mod manual;
pub mod realtime;
pub mod summary;

pub use composite::{CompositeProfile, PeriodProfile};
pub use indicator::VwapIndicator;
pub use manual::{FixedRangeProfile, RangeAnchor};
pub use realtime::SessionProfile;
pub use summary::ProfileSummary;
