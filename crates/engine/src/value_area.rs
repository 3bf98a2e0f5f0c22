//! Value Area computation (POC, VAH, VAL).
//!
//! Finds the Point of Control and expands the Value Area outward from it until
//! the target share of volume is covered.

use profile_core::PriceBin;
use serde::{Deserialize, Serialize};

/// Rows examined on each side per expansion step.
const LOOKAHEAD_ROWS: usize = 2;

/// POC and Value Area bounds as indices into the bin array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLevels {
    /// Bin with the highest volume.
    pub poc_index: usize,
    /// Highest bin inside the Value Area.
    pub vah_index: usize,
    /// Lowest bin inside the Value Area.
    pub val_index: usize,
}

/// Value Area analyzer.
#[derive(Debug, Clone, Copy)]
pub struct ProfileAnalyzer {
    /// Target Value Area coverage in percent (e.g., 70.0).
    value_area_pct: f64,
}

impl ProfileAnalyzer {
    /// Create a new analyzer.
    pub fn new(value_area_pct: f64) -> Self {
        Self { value_area_pct }
    }

    /// Compute POC and Value Area, flagging every bin inside it.
    ///
    /// Returns `None` when there are no bins.
    pub fn analyze(&self, bins: &mut [PriceBin]) -> Option<ProfileLevels> {
        let poc_index = Self::find_poc(bins)?;
        let (val_index, vah_index) = self.expand_value_area(bins, poc_index);

        for (i, bin) in bins.iter_mut().enumerate() {
            bin.in_value_area = (val_index..=vah_index).contains(&i);
        }

        Some(ProfileLevels {
            poc_index,
            vah_index,
            val_index,
        })
    }

    /// Index of the bin with the highest volume; the lowest such bin on ties.
    pub fn find_poc(bins: &[PriceBin]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, bin) in bins.iter().enumerate() {
            let volume = bin.total_volume();
            match best {
                Some((_, max)) if volume <= max => {}
                _ => best = Some((i, volume)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Expand from the POC until the target volume is covered.
    ///
    /// Each step sums up to two rows below the current low edge and up to two
    /// rows above the current high edge, then moves whichever edge has the
    /// larger sum by the rows that produced it. Ties move the low edge. A side
    /// stops once its edge reaches the end of the array.
    ///
    /// Returns `(val_index, vah_index)`.
    pub fn expand_value_area(&self, bins: &[PriceBin], poc_index: usize) -> (usize, usize) {
        let volumes: Vec<f64> = bins.iter().map(PriceBin::total_volume).collect();
        let total: f64 = volumes.iter().sum();
        let target = total * self.value_area_pct / 100.0;
        let last = volumes.len().saturating_sub(1);

        let mut low = poc_index;
        let mut high = poc_index;
        let mut accumulated = volumes.get(poc_index).copied().unwrap_or(0.0);

        while accumulated < target {
            let down_rows = low.min(LOOKAHEAD_ROWS);
            let up_rows = (last - high).min(LOOKAHEAD_ROWS);
            if down_rows == 0 && up_rows == 0 {
                break;
            }

            let down: f64 = volumes[low - down_rows..low].iter().sum();
            let up: f64 = volumes[high + 1..=high + up_rows].iter().sum();

            let expand_down = match (down_rows, up_rows) {
                (0, _) => false,
                (_, 0) => true,
                _ => down >= up,
            };

            if expand_down {
                low -= down_rows;
                accumulated += down;
            } else {
                high += up_rows;
                accumulated += up;
            }
        }

        (low, high)
    }
}

impl Default for ProfileAnalyzer {
    fn default() -> Self {
        Self::new(70.0)
    }
}
