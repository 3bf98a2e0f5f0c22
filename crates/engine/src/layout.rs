//! Row layout planning.
//!
//! Decides row size and row count for a price range, either from a fixed row
//! count or a fixed number of ticks per row, capped at a maximum row count.

use profile_core::RowLayout;
use serde::{Deserialize, Serialize};

/// Slack for floor() on prices that sit exactly on a row edge.
const LEVEL_EPSILON: f64 = 1e-9;

/// Row geometry for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowPlan {
    /// Lowest price of the range.
    pub low: f64,
    /// Highest price of the range.
    pub high: f64,
    /// Height of one row in price units.
    pub row_size: f64,
    /// Number of rows.
    pub rows: usize,
    /// Lower edge of the first row (half a tick below `low`).
    pub minimum: f64,
    /// Upper edge of the last row, never below `high`.
    pub maximum: f64,
    /// Whether rows are whole multiples of the tick size.
    pub tick_mode: bool,
}

impl RowPlan {
    /// Row containing `price`, clamped into the row array.
    #[inline]
    pub fn level_of(&self, price: f64) -> usize {
        self.clamp_level((price - self.minimum) / self.row_size)
    }

    /// First and last rows covered by a bar spanning `[low, high]`.
    ///
    /// The top edge is pulled down by half a tick so a high sitting on a row
    /// boundary does not spill into the next row.
    pub fn level_span(&self, low: f64, high: f64, tick_size: f64) -> (usize, usize) {
        let start = self.clamp_level((low - self.minimum) / self.row_size);
        let end = self.clamp_level((high - self.minimum - tick_size / 2.0) / self.row_size);
        (start, end.max(start))
    }

    /// Lower and upper edge prices of a row.
    #[inline]
    pub fn row_edges(&self, level: usize) -> (f64, f64) {
        let lower = self.minimum + level as f64 * self.row_size;
        (lower, lower + self.row_size)
    }

    /// Whether `price` lies within half a tick of the planned range.
    #[inline]
    pub fn contains(&self, price: f64, tick_size: f64) -> bool {
        let half = tick_size / 2.0;
        price >= self.low - half && price <= self.high + half
    }

    fn clamp_level(&self, raw: f64) -> usize {
        let level = (raw + LEVEL_EPSILON).floor();
        if level <= 0.0 {
            0
        } else {
            (level as usize).min(self.rows - 1)
        }
    }
}

/// Plans the rows of a profile.
#[derive(Debug, Clone, Copy)]
pub struct RowLayoutPlanner {
    layout: RowLayout,
    max_rows: usize,
}

impl RowLayoutPlanner {
    /// Create a planner. A zero cap is treated as one row.
    pub fn new(layout: RowLayout, max_rows: u32) -> Self {
        Self {
            layout,
            max_rows: (max_rows as usize).max(1),
        }
    }

    /// Plan rows for the range `[low, high]`.
    ///
    /// A tick size that is not a positive number yields a single row over
    /// the whole range.
    pub fn plan(&self, high: f64, low: f64, tick_size: f64) -> RowPlan {
        let span = high - low;
        if !(tick_size > 0.0 && tick_size.is_finite()) {
            let row_size = if span > 0.0 && span.is_finite() { span } else { 1.0 };
            return RowPlan {
                low,
                high,
                row_size,
                rows: 1,
                minimum: low,
                maximum: low + row_size,
                tick_mode: false,
            };
        }

        let half_tick = tick_size / 2.0;
        let minimum = low - half_tick;

        if span.is_nan() || span < half_tick {
            return RowPlan {
                low,
                high,
                row_size: tick_size,
                rows: 1,
                minimum,
                maximum: minimum + tick_size,
                tick_mode: true,
            };
        }

        // Count rows split [low - tick/2, high + tick/2] so the high owns a row
        let covered = span + tick_size;
        let (mut row_size, tick_mode) = match self.layout {
            RowLayout::Count(n) => {
                let size = covered / f64::from(n.max(1));
                if size <= tick_size {
                    (tick_size, true)
                } else {
                    (size, false)
                }
            }
            RowLayout::Ticks(k) => (tick_size * f64::from(k.max(1)), true),
        };

        let mut rows = Self::row_count(span, row_size, tick_size, tick_mode);
        if rows > self.max_rows {
            row_size = if tick_mode {
                (span / self.max_rows as f64 / tick_size - LEVEL_EPSILON).ceil() * tick_size
            } else {
                covered / self.max_rows as f64
            };
            rows = Self::row_count(span, row_size, tick_size, tick_mode);
        }
        let rows = rows.clamp(1, self.max_rows);

        RowPlan {
            low,
            high,
            row_size,
            rows,
            minimum,
            maximum: minimum + rows as f64 * row_size,
            tick_mode,
        }
    }

    /// Tick rows get one extra row so both range ends own a row.
    fn row_count(span: f64, row_size: f64, tick_size: f64, tick_mode: bool) -> usize {
        if tick_mode {
            ((span / row_size).round() as usize).saturating_add(1)
        } else {
            (((span + tick_size) / row_size).round() as usize).max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_layout() {
        let planner = RowLayoutPlanner::new(RowLayout::Ticks(1), 500);
        let plan = planner.plan(101.0, 99.0, 0.25);

        assert!(plan.tick_mode);
        assert!((plan.row_size - 0.25).abs() < 1e-10);
        assert_eq!(plan.rows, 9);
        assert!((plan.minimum - 98.875).abs() < 1e-10);
        // Every tick price lands in its own row
        assert_eq!(plan.level_of(99.0), 0);
        assert_eq!(plan.level_of(100.0), 4);
        assert_eq!(plan.level_of(101.0), 8);
    }

    #[test]
    fn test_count_layout() {
        let planner = RowLayoutPlanner::new(RowLayout::Count(4), 500);
        let plan = planner.plan(101.0, 99.0, 0.01);

        assert!(!plan.tick_mode);
        assert!((plan.row_size - 0.5025).abs() < 1e-10);
        assert_eq!(plan.rows, 4);
    }

    #[test]
    fn test_count_rows_cover_range_high() {
        let plan = RowLayoutPlanner::new(RowLayout::Count(4), 500).plan(101.0, 99.0, 0.25);

        assert_eq!(plan.rows, 4);
        assert!((plan.minimum - 98.875).abs() < 1e-10);
        assert!((plan.maximum - 101.125).abs() < 1e-10);
        let (_, top) = plan.row_edges(plan.rows - 1);
        assert!(top >= 101.0);
        // The high maps into the last row without clamping
        assert!(((101.0 - plan.minimum) / plan.row_size) < plan.rows as f64);
        assert_eq!(plan.level_span(99.0, 101.0, 0.25), (0, 3));
    }

    #[test]
    fn test_bad_tick_size_single_row() {
        for tick in [0.0, -0.25, f64::NAN] {
            let plan = RowLayoutPlanner::new(RowLayout::Ticks(1), 500).plan(101.0, 99.0, tick);
            assert_eq!(plan.rows, 1);
            assert!(plan.row_size > 0.0);
            assert_eq!(plan.level_of(100.0), 0);
        }
    }

    #[test]
    fn test_count_below_tick_switches_to_ticks() {
        let planner = RowLayoutPlanner::new(RowLayout::Count(100), 500);
        let plan = planner.plan(101.0, 99.0, 0.25);

        assert!(plan.tick_mode);
        assert!((plan.row_size - 0.25).abs() < 1e-10);
        assert_eq!(plan.rows, 9);
    }

    #[test]
    fn test_row_cap() {
        for &(high, low, tick) in &[(5000.0, 1000.0, 0.01), (1.2, 1.1, 0.00001), (70_000.0, 10.0, 0.1)] {
            for layout in [RowLayout::Count(1_000_000), RowLayout::Ticks(1), RowLayout::Count(750)] {
                let plan = RowLayoutPlanner::new(layout, 500).plan(high, low, tick);
                assert!(plan.rows <= 500, "{layout:?} produced {} rows", plan.rows);
                assert!(plan.rows >= 1);
            }
        }
    }

    #[test]
    fn test_capped_tick_rows_stay_on_tick_boundary() {
        let plan = RowLayoutPlanner::new(RowLayout::Ticks(1), 500).plan(200.0, 100.0, 0.1);
        let ticks_per_row = plan.row_size / 0.1;
        assert!((ticks_per_row - ticks_per_row.round()).abs() < 1e-9);
        assert!(plan.rows <= 500);
    }

    #[test]
    fn test_zero_range_single_row() {
        let plan = RowLayoutPlanner::new(RowLayout::Count(4), 500).plan(50.0, 50.0, 0.25);
        assert_eq!(plan.rows, 1);
        assert_eq!(plan.level_of(50.0), 0);
        assert!(plan.row_size > 0.0);
    }

    #[test]
    fn test_level_span_clamps() {
        let plan = RowLayoutPlanner::new(RowLayout::Ticks(1), 500).plan(101.0, 99.0, 0.25);

        assert_eq!(plan.level_span(99.0, 99.5, 0.25), (0, 2));
        // Doji maps to a single row
        assert_eq!(plan.level_span(100.0, 100.0, 0.25), (4, 4));
        // Wider than the profile: truncated to the row array
        assert_eq!(plan.level_span(90.0, 120.0, 0.25), (0, 8));
    }
}
