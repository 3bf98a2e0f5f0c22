//! Profile computation engine.
//!
//! [`ProfileEngine`] is stateless: every function takes the bar source and the
//! parameters explicitly. [`Area`] wraps one profile instance with its cache
//! and is what the studies hold on to.

use crate::{
    binner::VolumeBinner,
    cache::{Fingerprint, LayoutParams, ProfileCache},
    layout::RowLayoutPlanner,
    profile::{Profile, RangeStats},
    value_area::ProfileAnalyzer,
    vwap::{AnchoredVwapTracker, VwapPoint},
};
use ordered_float::OrderedFloat;
use profile_core::{
    AnchorPeriod, Bar, BandSpec, BarRangeSource, Config, Granularity, HistogramPlacement,
    RowLayout, SessionCalendar, TimestampMs,
};
use tracing::{debug, warn};

/// Anchored VWAP parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VwapParams {
    /// Reset period.
    pub anchor: AnchorPeriod,
    /// Enabled bands indexed by `BandId`.
    pub bands: [Option<BandSpec>; 3],
}

/// Parameters of one profile computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    pub layout: RowLayout,
    pub max_rows: u32,
    pub value_area_pct: f64,
    pub granularity: Granularity,
    /// Carried through to the profile for renderers.
    pub placement: HistogramPlacement,
    /// `None` disables the VWAP overlay.
    pub vwap: Option<VwapParams>,
}

impl ProfileParams {
    /// Create parameters from configuration.
    pub fn from_config(config: &Config) -> Self {
        let vwap = config.vwap.enabled.then(|| VwapParams {
            anchor: config.vwap.anchor,
            bands: config.vwap.active_bands(),
        });
        Self {
            layout: config.profile.layout,
            max_rows: config.profile.max_rows,
            value_area_pct: config.profile.value_area_pct,
            granularity: config.profile.granularity,
            placement: config.profile.placement,
            vwap,
        }
    }

    /// Hashable form used in cache fingerprints.
    pub fn layout_params(&self) -> LayoutParams {
        let band_multipliers = match &self.vwap {
            Some(vwap) => vwap.bands.map(|b| b.map(|s| OrderedFloat(s.multiplier))),
            None => [None; 3],
        };
        LayoutParams {
            layout: self.layout,
            max_rows: self.max_rows,
            value_area_pct: OrderedFloat(self.value_area_pct),
            granularity: self.granularity,
            placement: self.placement,
            vwap_anchor: self.vwap.map(|v| v.anchor),
            band_multipliers,
        }
    }
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Stateless profile computations.
pub struct ProfileEngine;

impl ProfileEngine {
    /// Scan `[from, to]` for high, low and volume, skipping gaps.
    ///
    /// `to` is clamped to the last index of the source. Returns `None` when
    /// `from >= to` after clamping or no bar in the range is present.
    pub fn scan_range<S>(source: &S, from: usize, to: usize) -> Option<RangeStats>
    where
        S: BarRangeSource + ?Sized,
    {
        let to = to.min(source.last_index()?);
        if from >= to {
            return None;
        }

        let mut bars = (from..=to).filter_map(|i| source.bar(i));
        let first = bars.next()?;
        let mut stats = RangeStats {
            from_index: from,
            to_index: to,
            high: first.high,
            low: first.low,
            total_volume: first.volume,
            bar_count: 1,
            first_ts: first.ts_ms,
            last_ts: first.ts_ms,
        };
        for bar in bars {
            stats.high = stats.high.max(bar.high);
            stats.low = stats.low.min(bar.low);
            stats.total_volume += bar.volume;
            stats.bar_count += 1;
            stats.last_ts = bar.ts_ms;
        }
        Some(stats)
    }

    /// Plan rows, bin volume and find POC and Value Area for a scanned range.
    pub fn build_profile<S>(source: &S, stats: &RangeStats, params: &ProfileParams) -> Profile
    where
        S: BarRangeSource + ?Sized,
    {
        let symbol = source.symbol();
        let planner = RowLayoutPlanner::new(params.layout, params.max_rows);
        let plan = planner.plan(stats.high, stats.low, symbol.tick_size);

        let fine = if params.granularity.is_fine() {
            Self::fine_bars(source, stats, params.granularity)
        } else {
            None
        };
        let (mut bins, granularity, classification) = match fine {
            Some(fine) => {
                let (bins, classification) = VolumeBinner::bin_fine(plan, symbol, fine);
                (bins, params.granularity, Some(classification))
            }
            None => {
                let bars = (stats.from_index..=stats.to_index).filter_map(|i| source.bar(i));
                (VolumeBinner::bin_bars(plan, symbol, bars), Granularity::Chart, None)
            }
        };

        let Some(levels) = ProfileAnalyzer::new(params.value_area_pct).analyze(&mut bins) else {
            return Profile {
                placement: params.placement,
                ..Profile::empty(stats.from_index, stats.to_index)
            };
        };
        let profile = Profile::new(stats, &plan, bins, levels, granularity, params.placement);

        debug!(
            from = stats.from_index,
            to = stats.to_index,
            rows = plan.rows,
            row_size = plan.row_size,
            poc = ?profile.poc_price(),
            ?granularity,
            fine_bars = classification.as_ref().map(|c| c.total_bars),
            ambiguous_frac = classification.as_ref().map(|c| c.ambiguous_frac()),
            "profile computed"
        );
        profile
    }

    /// Anchored VWAP over `[from, to]`, one point per present bar.
    pub fn build_vwap<S, C>(
        source: &S,
        from: usize,
        to: usize,
        calendar: &C,
        params: &VwapParams,
    ) -> Vec<VwapPoint>
    where
        S: BarRangeSource + ?Sized,
        C: SessionCalendar + ?Sized,
    {
        let mut tracker = AnchoredVwapTracker::new(params.bands);
        let Some(last) = source.last_index() else {
            return Vec::new();
        };

        (from..=to.min(last))
            .filter_map(|i| source.bar(i))
            .map(|bar| tracker.push(&bar, calendar.anchor_key(bar.ts_ms, params.anchor)))
            .collect()
    }

    /// Fetch finer bars covering the time span of a range.
    ///
    /// The window runs from the first bar's open up to just before the next
    /// present bar, or open-ended when the range reaches the end of the
    /// series. Returns `None` when nothing usable came back.
    fn fine_bars<S>(source: &S, stats: &RangeStats, granularity: Granularity) -> Option<Vec<Bar>>
    where
        S: BarRangeSource + ?Sized,
    {
        let to_ts = (stats.to_index + 1..source.len())
            .find_map(|i| source.bar(i))
            .map_or(TimestampMs::MAX, |next| next.ts_ms - 1);

        match source.fetch_fine(granularity, stats.first_ts, to_ts) {
            Ok(bars) if !bars.is_empty() => Some(bars),
            Ok(_) => {
                warn!(
                    ?granularity,
                    from_ts = stats.first_ts,
                    to_ts,
                    "no finer bars returned, using chart bars"
                );
                None
            }
            Err(e) => {
                warn!(?granularity, error = %e, "finer bar fetch failed, using chart bars");
                None
            }
        }
    }
}

/// One profile instance over a bar range.
#[derive(Debug, Clone)]
pub struct Area {
    from_index: usize,
    to_index: usize,
    cache: ProfileCache,
}

impl Area {
    /// Create an area over `[from_index, to_index]`.
    pub fn new(from_index: usize, to_index: usize) -> Self {
        Self {
            from_index,
            to_index,
            cache: ProfileCache::new(),
        }
    }

    /// Current bar range.
    pub fn range(&self) -> (usize, usize) {
        (self.from_index, self.to_index)
    }

    /// Move the area to a new bar range.
    pub fn set_range(&mut self, from_index: usize, to_index: usize) {
        self.from_index = from_index;
        self.to_index = to_index;
    }

    /// Bring the profile up to date and return it.
    ///
    /// The range is rescanned on every call. Binning is skipped when the
    /// range is historical and its fingerprint is unchanged.
    pub fn update<S, C>(&mut self, source: &S, calendar: &C, params: &ProfileParams) -> &Profile
    where
        S: BarRangeSource + ?Sized,
        C: SessionCalendar + ?Sized,
    {
        let Some(stats) = ProfileEngine::scan_range(source, self.from_index, self.to_index) else {
            self.cache.store_empty(self.from_index, self.to_index, params.placement);
            return self.cache.profile();
        };

        let fingerprint = Fingerprint::new(&stats, params.layout_params());
        if self.cache.is_fresh(&fingerprint) {
            return self.cache.profile();
        }

        let historical = source
            .last_index()
            .is_some_and(|last| stats.to_index < last);
        let profile = ProfileEngine::build_profile(source, &stats, params);
        let vwap = match &params.vwap {
            Some(vwap) => {
                ProfileEngine::build_vwap(source, stats.from_index, stats.to_index, calendar, vwap)
            }
            None => Vec::new(),
        };
        self.cache.store(fingerprint, historical, profile, vwap);
        self.cache.profile()
    }

    /// Last computed profile.
    pub fn profile(&self) -> &Profile {
        self.cache.profile()
    }

    /// Last computed VWAP points.
    pub fn vwap(&self) -> &[VwapPoint] {
        self.cache.vwap()
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    /// Whether the range lies entirely before the live bar.
    pub fn is_historical(&self) -> bool {
        self.cache.is_historical()
    }
}
