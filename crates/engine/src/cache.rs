//! Fingerprint cache for computed profiles.
//!
//! A profile is recomputed only when its inputs change. Inputs are summarised
//! by a [`Fingerprint`]: the scanned range statistics plus every layout
//! parameter that affects the output.

use crate::profile::{Profile, RangeStats};
use crate::vwap::VwapPoint;
use ordered_float::OrderedFloat;
use profile_core::{AnchorPeriod, Granularity, HistogramPlacement, RowLayout};
use tracing::trace;

/// Parameters that shape a profile, in hashable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutParams {
    pub layout: RowLayout,
    pub max_rows: u32,
    pub value_area_pct: OrderedFloat<f64>,
    pub granularity: Granularity,
    pub placement: HistogramPlacement,
    /// `None` when VWAP is disabled.
    pub vwap_anchor: Option<AnchorPeriod>,
    pub band_multipliers: [Option<OrderedFloat<f64>>; 3],
}

/// Everything a cached profile depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub from_index: usize,
    pub to_index: usize,
    pub high: OrderedFloat<f64>,
    pub low: OrderedFloat<f64>,
    pub total_volume: OrderedFloat<f64>,
    pub layout: LayoutParams,
}

impl Fingerprint {
    /// Fingerprint of a scanned range under the given layout.
    pub fn new(stats: &RangeStats, layout: LayoutParams) -> Self {
        Self {
            from_index: stats.from_index,
            to_index: stats.to_index,
            high: OrderedFloat(stats.high),
            low: OrderedFloat(stats.low),
            total_volume: OrderedFloat(stats.total_volume),
            layout,
        }
    }
}

/// Last computed profile of one area and the inputs it came from.
#[derive(Debug, Clone)]
pub struct ProfileCache {
    fingerprint: Option<Fingerprint>,
    historical: bool,
    profile: Profile,
    vwap: Vec<VwapPoint>,
    recomputes: u64,
}

impl ProfileCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            fingerprint: None,
            historical: false,
            profile: Profile::empty(0, 0),
            vwap: Vec::new(),
            recomputes: 0,
        }
    }

    /// Whether the cached output can be served for `fingerprint`.
    ///
    /// Only historical profiles are reused. A profile that still includes the
    /// live bar is recomputed on every query.
    pub fn is_fresh(&self, fingerprint: &Fingerprint) -> bool {
        let fresh = self.historical && self.fingerprint.as_ref() == Some(fingerprint);
        if fresh {
            trace!(
                from = fingerprint.from_index,
                to = fingerprint.to_index,
                "profile cache hit"
            );
        }
        fresh
    }

    /// Store freshly computed output.
    pub fn store(
        &mut self,
        fingerprint: Fingerprint,
        historical: bool,
        profile: Profile,
        vwap: Vec<VwapPoint>,
    ) {
        self.fingerprint = Some(fingerprint);
        self.historical = historical;
        self.profile = profile;
        self.vwap = vwap;
        self.recomputes += 1;
    }

    /// Replace the output with an empty profile for a degenerate range.
    pub fn store_empty(
        &mut self,
        from_index: usize,
        to_index: usize,
        placement: HistogramPlacement,
    ) {
        self.fingerprint = None;
        self.historical = false;
        self.profile = Profile {
            placement,
            ..Profile::empty(from_index, to_index)
        };
        self.vwap.clear();
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn vwap(&self) -> &[VwapPoint] {
        &self.vwap
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Whether the cached range lies entirely before the live bar.
    pub fn is_historical(&self) -> bool {
        self.historical
    }

    /// Number of full recomputations stored so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new()
    }
}
