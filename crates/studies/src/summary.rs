//! Serializable digest of a computed profile.

use profile_core::HistogramPlacement;
use profile_engine::{Profile, VwapPoint};
use serde::Serialize;

/// Key levels of one profile, as printed by `profile-replay`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub from_index: usize,
    pub to_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_key: Option<i64>,
    pub rows: usize,
    pub row_size: f64,
    pub placement: HistogramPlacement,
    pub total_volume: f64,
    pub poc: Option<f64>,
    pub vah: Option<f64>,
    pub val: Option<f64>,
    pub value_area_volume: f64,
    pub delta: f64,
    pub last_vwap: Option<f64>,
}

impl ProfileSummary {
    pub fn new(profile: &Profile, vwap: &[VwapPoint]) -> Self {
        Self {
            from_index: profile.from_index,
            to_index: profile.to_index,
            anchor_key: None,
            rows: profile.bins.len(),
            row_size: profile.row_size,
            placement: profile.placement,
            total_volume: profile.total_volume,
            poc: profile.poc_price(),
            vah: profile.value_area_high(),
            val: profile.value_area_low(),
            value_area_volume: profile.value_area_volume(),
            delta: profile.bins.iter().map(|b| b.delta()).sum(),
            last_vwap: vwap.last().map(|p| p.vwap),
        }
    }

    /// Tag the summary with the anchor period it belongs to.
    pub fn with_anchor_key(mut self, key: i64) -> Self {
        self.anchor_key = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_core::{Bar, Config, FixedOffsetCalendar, SymbolInfo};
    use profile_engine::{Area, ProfileParams};
    use profile_ingestion::BarSeries;

    #[test]
    fn test_summary_of_empty_profile() {
        let summary = ProfileSummary::new(&Profile::empty(2, 2), &[]);
        assert_eq!(summary.rows, 0);
        assert!(summary.poc.is_none());
        assert!(summary.last_vwap.is_none());

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("anchor_key").is_none());
    }

    #[test]
    fn test_summary_levels() {
        let bars = [(100.0, 101.0, 30.0), (101.0, 100.0, 10.0)]
            .iter()
            .enumerate()
            .map(|(i, &(open, close, volume))| {
                Some(Bar {
                    ts_ms: i as i64 * 60_000,
                    open,
                    high: 101.0,
                    low: 100.0,
                    close,
                    volume,
                })
            })
            .collect();
        let series = BarSeries::from_bars(SymbolInfo::new("ES", 0.25), bars);
        let mut config = Config::default();
        config.profile.placement = HistogramPlacement::Left;
        let mut area = Area::new(0, 1);
        area.update(&series, &FixedOffsetCalendar::utc(), &ProfileParams::from_config(&config));

        let summary = ProfileSummary::new(area.profile(), area.vwap()).with_anchor_key(7);
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.placement, HistogramPlacement::Left);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["placement"], "Left");
        assert_eq!(summary.anchor_key, Some(7));
        assert!((summary.total_volume - 40.0).abs() < 1e-10);
        // 30 bought, 10 sold
        assert!((summary.delta - 20.0).abs() < 1e-10);
        assert!(summary.val.unwrap() <= summary.poc.unwrap());
        assert!(summary.poc.unwrap() <= summary.vah.unwrap());
        assert!(summary.last_vwap.is_some());
    }
}
