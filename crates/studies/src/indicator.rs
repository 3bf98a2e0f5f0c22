//! Chart-wide anchored VWAP indicator.

use profile_core::config::VwapConfig;
use profile_core::{AnchorPeriod, BandSpec, BarRangeSource, SessionCalendar};
use profile_engine::{AnchoredVwapTracker, VwapPoint};

/// Anchored VWAP with bands for every bar of the series.
///
/// Closed bars are committed to the tracker once. The live bar is evaluated
/// with [`AnchoredVwapTracker::peek`] on every update so it can keep changing.
#[derive(Debug, Clone)]
pub struct VwapIndicator {
    anchor: AnchorPeriod,
    tracker: AnchoredVwapTracker,
    /// One entry per source index, `None` at gaps.
    points: Vec<Option<VwapPoint>>,
    /// Indices below this are committed.
    committed: usize,
}

impl VwapIndicator {
    /// Create an indicator resetting on `anchor` and drawing `bands`.
    pub fn new(anchor: AnchorPeriod, bands: [Option<BandSpec>; 3]) -> Self {
        Self {
            anchor,
            tracker: AnchoredVwapTracker::new(bands),
            points: Vec::new(),
            committed: 0,
        }
    }

    /// Create an indicator from VWAP configuration.
    pub fn from_config(config: &VwapConfig) -> Self {
        Self::new(config.anchor, config.active_bands())
    }

    /// Commit newly closed bars and re-evaluate the live one.
    pub fn update<S, C>(&mut self, source: &S, calendar: &C) -> &[Option<VwapPoint>]
    where
        S: BarRangeSource + ?Sized,
        C: SessionCalendar + ?Sized,
    {
        let Some(live) = source.last_index() else {
            self.reset();
            return &self.points;
        };
        if live < self.committed {
            self.reset();
        }

        self.points.truncate(self.committed);
        for index in self.committed..live {
            let point = source.bar(index).map(|bar| {
                let key = calendar.anchor_key(bar.ts_ms, self.anchor);
                self.tracker.push(&bar, key)
            });
            self.points.push(point);
        }
        self.committed = live;

        let point = source.bar(live).map(|bar| {
            let key = calendar.anchor_key(bar.ts_ms, self.anchor);
            self.tracker.peek(&bar, key)
        });
        self.points.push(point);
        &self.points
    }

    /// Points indexed like the source.
    pub fn points(&self) -> &[Option<VwapPoint>] {
        &self.points
    }

    /// Point of the most recent present bar.
    pub fn last(&self) -> Option<&VwapPoint> {
        self.points.iter().rev().find_map(Option::as_ref)
    }

    /// Forget every bar.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.points.clear();
        self.committed = 0;
    }
}
