//! Collaborator contracts consumed by the engine.
//!
//! The engine never owns market data. It reads bars by index from a
//! [`BarRangeSource`] and asks a [`SessionCalendar`] where anchor periods
//! start.

use crate::{AnchorPeriod, Bar, Granularity, Result, SymbolInfo, TimestampMs};

/// Index-addressable, possibly sparse bar series.
pub trait BarRangeSource {
    /// Instrument metadata (tick size).
    fn symbol(&self) -> &SymbolInfo;

    /// Number of indices in the series, gaps included.
    fn len(&self) -> usize;

    /// Bar at `index`, `None` for a gap or an out-of-range index.
    fn bar(&self, index: usize) -> Option<Bar>;

    /// Re-fetch the same symbol at a finer granularity over `[from_ts, to_ts]`.
    fn fetch_fine(
        &self,
        granularity: Granularity,
        from_ts: TimestampMs,
        to_ts: TimestampMs,
    ) -> Result<Vec<Bar>>;

    /// Whether the series holds no indices.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the live (still forming) bar.
    fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }
}

/// Resolves timestamps to trading sessions and anchor periods.
pub trait SessionCalendar {
    /// Start of the trading session containing `ts_ms`.
    fn session_start(&self, ts_ms: TimestampMs) -> TimestampMs;

    /// Key identifying the anchor period containing `ts_ms`.
    ///
    /// Two timestamps share a period exactly when their keys are equal.
    fn anchor_key(&self, ts_ms: TimestampMs, period: AnchorPeriod) -> i64;
}
