//! Anchored VWAP with deviation bands.
//!
//! Accumulates volume and volume-weighted typical price bar by bar. The running
//! variance adds each bar's squared distance from the VWAP as of that bar, so no
//! second pass over the range is needed. All sums restart when the anchor key
//! changes.

use profile_core::config::VwapConfig;
use profile_core::{Bar, BandId, BandSpec, TimestampMs};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cumulative sums of one anchor period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VwapState {
    /// Sum of volume.
    pub cumulative_volume: f64,
    /// Sum of volume * typical price.
    pub cumulative_tp_volume: f64,
    /// Sum of volume * (typical price - VWAP at that bar)^2.
    pub variance_sum: f64,
    /// Bars accumulated in this period.
    pub bars: u64,
    /// Anchor period the sums belong to.
    pub anchor_key: Option<i64>,
}

impl VwapState {
    /// Fold one bar into the sums, restarting them on a new anchor key.
    ///
    /// Returns `(vwap, deviation, reset)`.
    fn advance(&mut self, bar: &Bar, anchor_key: i64) -> (f64, f64, bool) {
        let reset = self.anchor_key != Some(anchor_key);
        if reset {
            *self = VwapState {
                anchor_key: Some(anchor_key),
                ..VwapState::default()
            };
        }

        let typical = bar.typical_price();
        self.cumulative_volume += bar.volume;
        self.cumulative_tp_volume += bar.volume * typical;
        self.bars += 1;

        let vwap = if self.cumulative_volume > 0.0 {
            self.cumulative_tp_volume / self.cumulative_volume
        } else {
            typical
        };

        self.variance_sum += (typical - vwap).powi(2) * bar.volume;

        // A single bar has no spread
        let deviation = if self.bars < 2 {
            0.0
        } else {
            (self.variance_sum / self.bars as f64).max(0.0).sqrt()
        };

        (vwap, deviation, reset)
    }
}

/// Upper and lower value of one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub upper: f64,
    pub lower: f64,
}

/// VWAP output for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VwapPoint {
    /// Bar timestamp.
    pub ts_ms: TimestampMs,
    /// Volume-weighted average typical price.
    pub vwap: f64,
    /// Standard deviation around the VWAP.
    pub deviation: f64,
    /// Band values indexed by `BandId`, `None` for disabled bands.
    pub bands: [Option<Band>; 3],
    /// Whether this bar started a new anchor period.
    pub is_anchor_start: bool,
}

impl VwapPoint {
    /// Values of one band.
    pub fn band(&self, id: BandId) -> Option<Band> {
        self.bands[id.index()]
    }
}

/// Incremental anchored VWAP.
#[derive(Debug, Clone)]
pub struct AnchoredVwapTracker {
    bands: [Option<BandSpec>; 3],
    state: VwapState,
}

impl AnchoredVwapTracker {
    /// Create a tracker drawing the given bands.
    pub fn new(bands: [Option<BandSpec>; 3]) -> Self {
        Self {
            bands,
            state: VwapState::default(),
        }
    }

    /// Create a tracker from VWAP configuration.
    pub fn from_config(config: &VwapConfig) -> Self {
        Self::new(config.active_bands())
    }

    /// Commit a closed bar.
    pub fn push(&mut self, bar: &Bar, anchor_key: i64) -> VwapPoint {
        let (vwap, deviation, reset) = self.state.advance(bar, anchor_key);
        if reset {
            debug!(ts_ms = bar.ts_ms, anchor_key, "VWAP anchor reset");
        }
        self.point(bar.ts_ms, vwap, deviation, reset)
    }

    /// Evaluate a bar (usually the live one) without committing it.
    pub fn peek(&self, bar: &Bar, anchor_key: i64) -> VwapPoint {
        let mut state = self.state;
        let (vwap, deviation, reset) = state.advance(bar, anchor_key);
        self.point(bar.ts_ms, vwap, deviation, reset)
    }

    /// Current cumulative sums.
    pub fn state(&self) -> &VwapState {
        &self.state
    }

    /// Clear all sums.
    pub fn reset(&mut self) {
        self.state = VwapState::default();
    }

    fn point(&self, ts_ms: TimestampMs, vwap: f64, deviation: f64, reset: bool) -> VwapPoint {
        let bands = self.bands.map(|spec| {
            spec.map(|s| Band {
                upper: vwap + deviation * s.multiplier,
                lower: vwap - deviation * s.multiplier,
            })
        });
        VwapPoint {
            ts_ms,
            vwap,
            deviation,
            bands,
            is_anchor_start: reset,
        }
    }
}

impl Default for AnchoredVwapTracker {
    fn default() -> Self {
        Self::from_config(&VwapConfig::default())
    }
}
