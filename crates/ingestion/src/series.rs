//! In-memory sparse bar series.
//!
//! Holds chart bars by index (with gaps) together with the raw trade tape, so
//! finer granularities can be rebuilt on request.

use crate::bar_builder::BarBuilder;
use profile_core::{Bar, BarRangeSource, Error, Granularity, Result, SymbolInfo, TimestampMs, Trade};
use tracing::trace;

/// Chart bars addressable by index, plus the trades they were built from.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: SymbolInfo,
    bars: Vec<Option<Bar>>,
    trades: Vec<Trade>,
}

impl BarSeries {
    /// Create an empty series.
    pub fn new(symbol: SymbolInfo) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
            trades: Vec::new(),
        }
    }

    /// Create a series from bars, `None` entries are gaps.
    pub fn from_bars(symbol: SymbolInfo, bars: Vec<Option<Bar>>) -> Self {
        Self {
            symbol,
            bars,
            trades: Vec::new(),
        }
    }

    /// Append a bar.
    pub fn push(&mut self, bar: Bar) {
        self.bars.push(Some(bar));
    }

    /// Append a gap.
    pub fn push_gap(&mut self) {
        self.bars.push(None);
    }

    /// Replace the live (last) bar, e.g. after a new tick updated it.
    ///
    /// Appends when the series is empty.
    pub fn update_last(&mut self, bar: Bar) {
        match self.bars.last_mut() {
            Some(slot) => *slot = Some(bar),
            None => self.bars.push(Some(bar)),
        }
    }

    /// Record a trade on the tape.
    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Record multiple trades on the tape.
    pub fn record_trades(&mut self, trades: &[Trade]) {
        self.trades.extend_from_slice(trades);
    }
}

impl BarRangeSource for BarSeries {
    fn symbol(&self) -> &SymbolInfo {
        &self.symbol
    }

    fn len(&self) -> usize {
        self.bars.len()
    }

    fn bar(&self, index: usize) -> Option<Bar> {
        self.bars.get(index).copied().flatten()
    }

    fn fetch_fine(
        &self,
        granularity: Granularity,
        from_ts: TimestampMs,
        to_ts: TimestampMs,
    ) -> Result<Vec<Bar>> {
        if granularity == Granularity::Chart {
            return Err(Error::fetch("chart granularity is not a fine source"));
        }
        if self.trades.is_empty() {
            return Err(Error::fetch(format!(
                "no trades recorded for {}",
                self.symbol.symbol
            )));
        }

        let window: Vec<Trade> = self
            .trades
            .iter()
            .filter(|t| t.ts_ms >= from_ts && t.ts_ms <= to_ts)
            .copied()
            .collect();
        let bars = BarBuilder::build(granularity, &window);
        trace!(
            ?granularity,
            trades = window.len(),
            bars = bars.len(),
            "built fine bars"
        );
        Ok(bars)
    }
}
