//! Fixed-range profile drawn between two user anchors.

use profile_core::{BarRangeSource, SessionCalendar, TimestampMs};
use profile_engine::{Area, Profile, ProfileParams, VwapPoint};

/// One end of a manually drawn range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAnchor {
    /// Bar index.
    Index(usize),
    /// Bar time, snapped to the nearest present bar inside the range.
    Time(TimestampMs),
}

/// Profile over a fixed, user-chosen bar range.
///
/// The anchors may be given in either order. The profile becomes historical
/// once its last bar is strictly before the live bar.
#[derive(Debug, Clone)]
pub struct FixedRangeProfile {
    start: RangeAnchor,
    end: RangeAnchor,
    params: ProfileParams,
    area: Area,
}

impl FixedRangeProfile {
    /// Create a profile over `[from_index, to_index]`.
    pub fn new(from_index: usize, to_index: usize, params: ProfileParams) -> Self {
        Self::with_anchors(RangeAnchor::Index(from_index), RangeAnchor::Index(to_index), params)
    }

    /// Create a profile between two anchors.
    pub fn with_anchors(start: RangeAnchor, end: RangeAnchor, params: ProfileParams) -> Self {
        Self {
            start,
            end,
            params,
            area: Area::new(0, 0),
        }
    }

    /// Move the anchors.
    pub fn set_anchors(&mut self, start: RangeAnchor, end: RangeAnchor) {
        self.start = start;
        self.end = end;
    }

    /// Change the layout parameters.
    pub fn set_params(&mut self, params: ProfileParams) {
        self.params = params;
    }

    pub fn params(&self) -> &ProfileParams {
        &self.params
    }

    /// Bar range covered by the anchors, `None` when no bar falls inside.
    pub fn resolve<S>(&self, source: &S) -> Option<(usize, usize)>
    where
        S: BarRangeSource + ?Sized,
    {
        match (self.start, self.end) {
            (RangeAnchor::Index(a), RangeAnchor::Index(b)) => Some((a.min(b), a.max(b))),
            (start, end) => {
                let (from_ts, to_ts) = (anchor_ts(source, start)?, anchor_ts(source, end)?);
                let (from_ts, to_ts) = (from_ts.min(to_ts), from_ts.max(to_ts));

                let mut inside = (0..source.len())
                    .filter_map(|i| source.bar(i).map(|bar| (i, bar.ts_ms)))
                    .filter(|&(_, ts)| ts >= from_ts && ts <= to_ts)
                    .map(|(i, _)| i);
                let first = inside.next()?;
                let last = inside.last().unwrap_or(first);
                Some((first, last))
            }
        }
    }

    /// Recompute if needed and return the profile.
    pub fn update<S, C>(&mut self, source: &S, calendar: &C) -> &Profile
    where
        S: BarRangeSource + ?Sized,
        C: SessionCalendar + ?Sized,
    {
        // An unresolvable range becomes a degenerate one
        let (from, to) = self.resolve(source).unwrap_or((0, 0));
        self.area.set_range(from, to);
        self.area.update(source, calendar, &self.params)
    }

    pub fn profile(&self) -> &Profile {
        self.area.profile()
    }

    pub fn vwap(&self) -> &[VwapPoint] {
        self.area.vwap()
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    /// Whether the range lies entirely before the live bar.
    pub fn is_historical(&self) -> bool {
        self.area.is_historical()
    }
}

/// Timestamp an anchor points at. Index anchors use their bar's time.
fn anchor_ts<S>(source: &S, anchor: RangeAnchor) -> Option<TimestampMs>
where
    S: BarRangeSource + ?Sized,
{
    match anchor {
        RangeAnchor::Time(ts) => Some(ts),
        RangeAnchor::Index(i) => source.bar(i).map(|bar| bar.ts_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use profile_core::{Bar, FixedOffsetCalendar, SymbolInfo};
    use profile_ingestion::BarSeries;

    const MINUTE: i64 = 60_000;

    fn make_bar(i: i64, price: f64, volume: f64) -> Bar {
        Bar {
            ts_ms: i * MINUTE,
            open: price,
            high: price + 0.5,
            low: price - 0.5,
            close: price + 0.25,
            volume,
        }
    }

    fn make_series(n: i64) -> BarSeries {
        let mut series = BarSeries::new(SymbolInfo::new("ES", 0.25));
        for i in 0..n {
            series.push(make_bar(i, 100.0 + i as f64 * 0.25, 10.0 * (i + 1) as f64));
        }
        series
    }

    #[test]
    fn test_index_anchors_any_order() {
        let series = make_series(10);
        let study = FixedRangeProfile::new(6, 2, ProfileParams::default());
        assert_eq!(study.resolve(&series), Some((2, 6)));
    }

    #[test]
    fn test_time_anchors_snap_to_bars() {
        let mut series = make_series(4);
        series.push_gap();
        series.push(make_bar(5, 101.0, 10.0));

        let study = FixedRangeProfile::with_anchors(
            RangeAnchor::Time(MINUTE / 2),
            RangeAnchor::Time(5 * MINUTE + 1),
            ProfileParams::default(),
        );
        assert_eq!(study.resolve(&series), Some((1, 5)));

        let mixed = FixedRangeProfile::with_anchors(
            RangeAnchor::Index(3),
            RangeAnchor::Time(0),
            ProfileParams::default(),
        );
        assert_eq!(mixed.resolve(&series), Some((0, 3)));

        let outside = FixedRangeProfile::with_anchors(
            RangeAnchor::Time(100 * MINUTE),
            RangeAnchor::Time(200 * MINUTE),
            ProfileParams::default(),
        );
        assert_eq!(outside.resolve(&series), None);
    }

    #[test]
    fn test_historical_range_cached() {
        let mut series = make_series(10);
        let calendar = FixedOffsetCalendar::utc();
        let mut study = FixedRangeProfile::new(0, 4, ProfileParams::default());

        let volume = study.update(&series, &calendar).total_volume;
        assert_relative_eq!(volume, 150.0, max_relative = 1e-9);
        assert!(study.is_historical());

        series.push(make_bar(10, 105.0, 500.0));
        study.update(&series, &calendar);
        assert_eq!(study.area().cache().recompute_count(), 1);
    }

    #[test]
    fn test_range_through_live_bar() {
        let mut series = make_series(5);
        let calendar = FixedOffsetCalendar::utc();
        let mut study = FixedRangeProfile::new(2, 4, ProfileParams::default());

        study.update(&series, &calendar);
        assert!(!study.is_historical());

        series.update_last(make_bar(4, 101.0, 80.0));
        let volume = study.update(&series, &calendar).total_volume;
        assert_relative_eq!(volume, 30.0 + 40.0 + 80.0, max_relative = 1e-9);
        assert_eq!(study.vwap().len(), 3);
    }

    #[test]
    fn test_unresolved_range_is_empty() {
        let series = make_series(3);
        let mut study = FixedRangeProfile::with_anchors(
            RangeAnchor::Time(-10 * MINUTE),
            RangeAnchor::Time(-5 * MINUTE),
            ProfileParams::default(),
        );
        assert!(study.update(&series, &FixedOffsetCalendar::utc()).is_empty());
    }
}
