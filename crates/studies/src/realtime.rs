//! Realtime profile of the current anchor period.

use profile_core::{AnchorPeriod, BarRangeSource, SessionCalendar};
use profile_engine::{Area, Profile, ProfileParams, VwapPoint};
use tracing::debug;

/// Profile from the first bar of the current period up to the live bar.
///
/// A fresh [`Area`] is started whenever the live bar enters a new period.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    period: AnchorPeriod,
    params: ProfileParams,
    area: Option<Area>,
    period_key: Option<i64>,
}

impl SessionProfile {
    /// Create a study resetting on `period`.
    pub fn new(period: AnchorPeriod, params: ProfileParams) -> Self {
        Self {
            period,
            params,
            area: None,
            period_key: None,
        }
    }

    /// Bring the profile up to date with the live bar.
    ///
    /// Returns `None` until the source holds a bar.
    pub fn update<S, C>(&mut self, source: &S, calendar: &C) -> Option<&Profile>
    where
        S: BarRangeSource + ?Sized,
        C: SessionCalendar + ?Sized,
    {
        let last = source.last_index()?;
        let (live_index, live) = (0..=last)
            .rev()
            .find_map(|i| source.bar(i).map(|bar| (i, bar)))?;
        let key = calendar.anchor_key(live.ts_ms, self.period);

        if self.area.is_none() || self.period_key != Some(key) {
            let start = period_start(source, calendar, self.period, live_index, key);
            debug!(period = ?self.period, key, start, "session profile started");
            self.area = Some(Area::new(start, usize::MAX));
            self.period_key = Some(key);
        }

        let params = &self.params;
        self.area
            .as_mut()
            .map(|area| area.update(source, calendar, params))
    }

    /// Key of the period being profiled.
    pub fn period_key(&self) -> Option<i64> {
        self.period_key
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.area.as_ref().map(Area::profile)
    }

    pub fn vwap(&self) -> &[VwapPoint] {
        self.area.as_ref().map(Area::vwap).unwrap_or(&[])
    }

    pub fn area(&self) -> Option<&Area> {
        self.area.as_ref()
    }

    /// Change the layout parameters.
    pub fn set_params(&mut self, params: ProfileParams) {
        self.params = params;
    }
}

/// First index of the period containing `index`, walking back over gaps.
fn period_start<S, C>(source: &S, calendar: &C, period: AnchorPeriod, index: usize, key: i64) -> usize
where
    S: BarRangeSource + ?Sized,
    C: SessionCalendar + ?Sized,
{
    let mut start = index;
    for i in (0..index).rev() {
        match source.bar(i) {
            Some(bar) if calendar.anchor_key(bar.ts_ms, period) == key => start = i,
            Some(_) => break,
            None => {}
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use profile_core::{Bar, FixedOffsetCalendar, SymbolInfo};
    use profile_ingestion::BarSeries;

    const HOUR: i64 = 3_600_000;
    // 2024-01-01 00:00:00 UTC
    const JAN_1: i64 = 1_704_067_200_000;

    fn make_bar(ts_ms: i64, price: f64, volume: f64) -> Bar {
        Bar {
            ts_ms,
            open: price,
            high: price + 1.0,
            low: price - 1.0,
            close: price + 0.5,
            volume,
        }
    }

    #[test]
    fn test_profile_starts_at_session_open() {
        let mut series = BarSeries::new(SymbolInfo::new("ES", 0.25));
        series.push(make_bar(JAN_1 + 20 * HOUR, 100.0, 999.0));
        series.push(make_bar(JAN_1 + 22 * HOUR, 100.0, 999.0));
        series.push(make_bar(JAN_1 + 25 * HOUR, 100.0, 10.0));
        series.push_gap();
        series.push(make_bar(JAN_1 + 27 * HOUR, 101.0, 20.0));
        series.push(make_bar(JAN_1 + 28 * HOUR, 102.0, 30.0));

        let calendar = FixedOffsetCalendar::utc();
        let mut study = SessionProfile::new(AnchorPeriod::Session, ProfileParams::default());
        let profile = study.update(&series, &calendar).unwrap();

        assert_eq!(profile.from_index, 2);
        assert_eq!(profile.to_index, 5);
        assert_relative_eq!(profile.total_volume, 60.0, max_relative = 1e-9);
        assert_eq!(study.vwap().len(), 3);
        assert!(study.vwap()[0].is_anchor_start);
    }

    #[test]
    fn test_new_period_starts_fresh_area() {
        let mut series = BarSeries::new(SymbolInfo::new("ES", 0.25));
        series.push(make_bar(JAN_1 + HOUR, 100.0, 10.0));
        series.push(make_bar(JAN_1 + 2 * HOUR, 100.0, 10.0));

        let calendar = FixedOffsetCalendar::utc();
        let mut study = SessionProfile::new(AnchorPeriod::Day, ProfileParams::default());
        study.update(&series, &calendar);
        let first_key = study.period_key();

        series.push(make_bar(JAN_1 + 25 * HOUR, 105.0, 40.0));
        series.push(make_bar(JAN_1 + 26 * HOUR, 106.0, 50.0));
        let profile = study.update(&series, &calendar).unwrap();

        assert_eq!(profile.from_index, 2);
        assert_relative_eq!(profile.total_volume, 90.0, max_relative = 1e-9);
        assert!(profile.low >= 104.0);
        assert_ne!(study.period_key(), first_key);
    }

    #[test]
    fn test_live_updates_recompute() {
        let mut series = BarSeries::new(SymbolInfo::new("ES", 0.25));
        series.push(make_bar(JAN_1, 100.0, 10.0));
        series.push(make_bar(JAN_1 + HOUR, 100.0, 10.0));

        let calendar = FixedOffsetCalendar::utc();
        let mut study = SessionProfile::new(AnchorPeriod::Session, ProfileParams::default());
        study.update(&series, &calendar);

        series.update_last(make_bar(JAN_1 + HOUR, 100.0, 25.0));
        let profile = study.update(&series, &calendar).unwrap();
        assert_relative_eq!(profile.total_volume, 35.0, max_relative = 1e-9);
        assert_eq!(study.area().unwrap().cache().recompute_count(), 2);
    }

    #[test]
    fn test_empty_source() {
        let series = BarSeries::new(SymbolInfo::new("ES", 0.25));
        let mut study = SessionProfile::new(AnchorPeriod::Session, ProfileParams::default());
        assert!(study.update(&series, &FixedOffsetCalendar::utc()).is_none());
        assert!(study.vwap().is_empty());
    }
}
