//! Profile output types.

use crate::layout::RowPlan;
use crate::value_area::ProfileLevels;
use profile_core::{Granularity, HistogramPlacement, PriceBin, Size, TimestampMs};
use serde::{Deserialize, Serialize};

/// Summary of the valid bars in an index range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    /// First index of the range.
    pub from_index: usize,
    /// Last index of the range (inclusive).
    pub to_index: usize,
    /// Highest high.
    pub high: f64,
    /// Lowest low.
    pub low: f64,
    /// Sum of bar volumes.
    pub total_volume: Size,
    /// Number of bars present (gaps excluded).
    pub bar_count: usize,
    /// Timestamp of the first present bar.
    pub first_ts: TimestampMs,
    /// Timestamp of the last present bar.
    pub last_ts: TimestampMs,
}

/// Volume profile of one bar range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// First bar index.
    pub from_index: usize,
    /// Last bar index (inclusive).
    pub to_index: usize,
    /// Bins ascending by price.
    pub bins: Vec<PriceBin>,
    /// Highest price of the range.
    pub high: f64,
    /// Lowest price of the range.
    pub low: f64,
    /// Sum of binned volume.
    pub total_volume: Size,
    /// Row height in price units.
    pub row_size: f64,
    /// Index of the POC bin.
    pub poc_index: usize,
    /// Index of the VAH bin.
    pub vah_index: usize,
    /// Index of the VAL bin.
    pub val_index: usize,
    /// Granularity the volume was actually placed with.
    pub granularity: Granularity,
    /// Side of the chart the histogram grows from.
    pub placement: HistogramPlacement,
}

impl Profile {
    /// A profile with nothing to draw.
    pub fn empty(from_index: usize, to_index: usize) -> Self {
        Self {
            from_index,
            to_index,
            bins: Vec::new(),
            high: 0.0,
            low: 0.0,
            total_volume: 0.0,
            row_size: 0.0,
            poc_index: 0,
            vah_index: 0,
            val_index: 0,
            granularity: Granularity::Chart,
            placement: HistogramPlacement::Right,
        }
    }

    /// Assemble a profile from analyzed bins.
    pub fn new(
        stats: &RangeStats,
        plan: &RowPlan,
        bins: Vec<PriceBin>,
        levels: ProfileLevels,
        granularity: Granularity,
        placement: HistogramPlacement,
    ) -> Self {
        let total_volume = bins.iter().map(PriceBin::total_volume).sum();
        Self {
            from_index: stats.from_index,
            to_index: stats.to_index,
            bins,
            high: stats.high,
            low: stats.low,
            total_volume,
            row_size: plan.row_size,
            poc_index: levels.poc_index,
            vah_index: levels.vah_index,
            val_index: levels.val_index,
            granularity,
            placement,
        }
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// POC bin.
    pub fn poc(&self) -> Option<&PriceBin> {
        self.bins.get(self.poc_index)
    }

    /// Highest Value Area bin.
    pub fn vah(&self) -> Option<&PriceBin> {
        self.bins.get(self.vah_index)
    }

    /// Lowest Value Area bin.
    pub fn val(&self) -> Option<&PriceBin> {
        self.bins.get(self.val_index)
    }

    /// Center price of the POC bin.
    pub fn poc_price(&self) -> Option<f64> {
        self.poc().map(|b| b.mid_price)
    }

    /// Upper edge of the Value Area.
    pub fn value_area_high(&self) -> Option<f64> {
        self.vah().map(|b| b.max_price)
    }

    /// Lower edge of the Value Area.
    pub fn value_area_low(&self) -> Option<f64> {
        self.val().map(|b| b.min_price)
    }

    /// Volume inside the Value Area.
    pub fn value_area_volume(&self) -> Size {
        self.bins
            .iter()
            .filter(|b| b.in_value_area)
            .map(PriceBin::total_volume)
            .sum()
    }

    /// Each bin's volume relative to the POC, for histogram widths.
    ///
    /// Widths are measured from the [`placement`](Self::placement) side.
    pub fn normalized_volumes(&self) -> Vec<f64> {
        let max = self.poc().map(PriceBin::total_volume).unwrap_or(0.0);
        self.bins
            .iter()
            .map(|b| if max > 0.0 { b.total_volume() / max } else { 0.0 })
            .collect()
    }
}
