//! One profile per anchor period across the whole series.

use profile_core::{AnchorPeriod, BarRangeSource, SessionCalendar};
use profile_engine::{Area, Profile, ProfileParams, VwapPoint};
use tracing::debug;

/// Profile of a single anchor period.
#[derive(Debug, Clone)]
pub struct PeriodProfile {
    anchor_key: i64,
    from_index: usize,
    area: Area,
}

impl PeriodProfile {
    /// Key of the period.
    pub fn anchor_key(&self) -> i64 {
        self.anchor_key
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
}

/// Splits the series into anchor periods and keeps one [`Area`] for each.
///
/// Bars are scanned incrementally. Closed periods are historical and served
/// from their caches; only the period holding the live bar is recomputed.
#[derive(Debug, Clone)]
pub struct CompositeProfile {
    period: AnchorPeriod,
    params: ProfileParams,
    periods: Vec<PeriodProfile>,
    /// Next index to assign to a period.
    scanned: usize,
}

impl CompositeProfile {
    /// Create a study splitting on `period`.
    pub fn new(period: AnchorPeriod, params: ProfileParams) -> Self {
        Self {
            period,
            params,
            periods: Vec::new(),
            scanned: 0,
        }
    }

    /// Assign new bars to periods and update every period's profile.
    pub fn update<S, C>(&mut self, source: &S, calendar: &C) -> &[PeriodProfile]
    where
        S: BarRangeSource + ?Sized,
        C: SessionCalendar + ?Sized,
    {
        if source.len() < self.scanned {
            self.clear();
        }

        // The live index is rescanned: a gap there may since have been filled
        let first = self.scanned.saturating_sub(1);
        for index in first..source.len() {
            let Some(bar) = source.bar(index) else {
                continue;
            };
            let key = calendar.anchor_key(bar.ts_ms, self.period);
            match self.periods.last_mut() {
                Some(current) if current.anchor_key == key => {
                    current.area.set_range(current.from_index, index);
                }
                _ => {
                    debug!(period = ?self.period, key, from = index, "composite period opened");
                    self.periods.push(PeriodProfile {
                        anchor_key: key,
                        from_index: index,
                        area: Area::new(index, index),
                    });
                }
            }
        }
        self.scanned = source.len();

        for period in &mut self.periods {
            period.area.update(source, calendar, &self.params);
        }
        &self.periods
    }

    pub fn periods(&self) -> &[PeriodProfile] {
        &self.periods
    }

    /// Change the layout parameters. Every period recomputes on the next update.
    pub fn set_params(&mut self, params: ProfileParams) {
        self.params = params;
    }

    /// Drop every period.
    pub fn clear(&mut self) {
        self.periods.clear();
        self.scanned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use profile_core::{Bar, FixedOffsetCalendar, RowLayout, SymbolInfo};
    use profile_ingestion::BarSeries;

    const HOUR: i64 = 3_600_000;
    // 2024-01-01 00:00:00 UTC
    const JAN_1: i64 = 1_704_067_200_000;

    fn make_bar(ts_ms: i64, price: f64, volume: f64) -> Bar {
        Bar {
            ts_ms,
            open: price,
            high: price + 0.5,
            low: price - 0.5,
            close: price,
            volume,
        }
    }

    /// Three days of four hourly bars each, prices rising by day.
    fn three_days() -> BarSeries {
        let mut series = BarSeries::new(SymbolInfo::new("ES", 0.25));
        for day in 0..3 {
            for hour in 0..4 {
                let ts = JAN_1 + (day * 24 + 10 + hour) * HOUR;
                series.push(make_bar(ts, 100.0 + 10.0 * day as f64, 10.0 + hour as f64));
            }
        }
        series
    }

    #[test]
    fn test_one_area_per_day() {
        let series = three_days();
        let mut study = CompositeProfile::new(AnchorPeriod::Day, ProfileParams::default());
        let periods = study.update(&series, &FixedOffsetCalendar::utc());

        assert_eq!(periods.len(), 3);
        for (day, period) in periods.iter().enumerate() {
            let profile = period.profile();
            assert_eq!(profile.from_index, day * 4);
            assert_eq!(profile.to_index, day * 4 + 3);
            assert_relative_eq!(profile.total_volume, 46.0, max_relative = 1e-9);
            assert!(profile.low >= 99.5 + 10.0 * day as f64);
        }

        assert!(periods[0].area().is_historical());
        assert!(periods[1].area().is_historical());
        assert!(!periods[2].area().is_historical());
    }

    #[test]
    fn test_closed_periods_served_from_cache() {
        let mut series = three_days();
        let calendar = FixedOffsetCalendar::utc();
        let mut study = CompositeProfile::new(AnchorPeriod::Day, ProfileParams::default());
        study.update(&series, &calendar);

        series.update_last(make_bar(JAN_1 + (48 + 13) * HOUR, 121.0, 100.0));
        series.push(make_bar(JAN_1 + (48 + 14) * HOUR, 122.0, 5.0));
        let periods = study.update(&series, &calendar);

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].area().cache().recompute_count(), 1);
        assert_eq!(periods[1].area().cache().recompute_count(), 1);
        assert_eq!(periods[2].area().cache().recompute_count(), 2);
        assert_eq!(periods[2].profile().to_index, 12);
        assert_relative_eq!(periods[2].profile().total_volume, 10.0 + 11.0 + 12.0 + 100.0 + 5.0);
    }

    #[test]
    fn test_new_period_appended() {
        let mut series = three_days();
        let calendar = FixedOffsetCalendar::utc();
        let mut study = CompositeProfile::new(AnchorPeriod::Day, ProfileParams::default());
        study.update(&series, &calendar);

        series.push_gap();
        series.push(make_bar(JAN_1 + (72 + 10) * HOUR, 130.0, 7.0));
        series.push(make_bar(JAN_1 + (72 + 11) * HOUR, 131.0, 8.0));
        let periods = study.update(&series, &calendar);

        assert_eq!(periods.len(), 4);
        assert_eq!(periods[3].profile().from_index, 13);
        assert!(periods[2].area().is_historical());
        assert_relative_eq!(periods[3].profile().total_volume, 15.0);
    }

    #[test]
    fn test_params_change_recomputes_all() {
        let series = three_days();
        let calendar = FixedOffsetCalendar::utc();
        let mut study = CompositeProfile::new(AnchorPeriod::Day, ProfileParams::default());
        study.update(&series, &calendar);

        study.set_params(ProfileParams {
            layout: RowLayout::Count(2),
            ..ProfileParams::default()
        });
        let periods = study.update(&series, &calendar);
        assert!(periods.iter().all(|p| p.area().cache().recompute_count() == 2));
        assert!(periods.iter().all(|p| p.profile().bins.len() <= 2));
    }

    #[test]
    fn test_no_anchor_single_period() {
        let series = three_days();
        let mut study = CompositeProfile::new(AnchorPeriod::None, ProfileParams::default());
        let periods = study.update(&series, &FixedOffsetCalendar::utc());

        assert_eq!(periods.len(), 1);
        assert_relative_eq!(periods[0].profile().total_volume, 138.0);
    }
}
