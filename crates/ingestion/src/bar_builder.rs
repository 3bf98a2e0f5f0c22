//! Fine bar building from trades.
//!
//! Builds OHLCV bars on second or minute boundaries, or one bar per trade for
//! tick granularity. These are the finer bars the binner re-fetches when a
//! profile places volume at close prices instead of spreading chart bars.

use profile_core::{Bar, Granularity, TimestampMs, Trade};
use std::collections::BTreeMap;

/// A bar that's currently being built.
#[derive(Debug, Clone)]
struct BarInProgress {
    ts_ms: TimestampMs,
    open: Option<f64>,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BarInProgress {
    fn new(ts_ms: TimestampMs) -> Self {
        Self {
            ts_ms,
            open: None,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            close: 0.0,
            volume: 0.0,
        }
    }

    fn add_trade(&mut self, price: f64, size: f64) {
        if self.open.is_none() {
            self.open = Some(price);
        }
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += size;
    }

    fn to_bar(&self) -> Option<Bar> {
        let open = self.open?;
        Some(Bar {
            ts_ms: self.ts_ms,
            open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// Builder for fine bars from trades.
pub struct BarBuilder {
    /// Bucket width, `None` for one bar per trade.
    period_ms: Option<i64>,
    /// Bars being built, keyed by bucket timestamp.
    bars: BTreeMap<TimestampMs, BarInProgress>,
    /// Tick bars, already complete.
    ticks: Vec<Bar>,
}

impl BarBuilder {
    /// Create a new bar builder for the given granularity.
    ///
    /// `Chart` and `Tick` both produce one bar per trade.
    pub fn new(granularity: Granularity) -> Self {
        Self {
            period_ms: granularity.period_ms(),
            bars: BTreeMap::new(),
            ticks: Vec::new(),
        }
    }

    /// Aggregate a slice of trades in one pass.
    pub fn build(granularity: Granularity, trades: &[Trade]) -> Vec<Bar> {
        let mut builder = Self::new(granularity);
        builder.add_trades(trades);
        builder.finish()
    }

    /// Add a trade.
    pub fn add_trade(&mut self, trade: &Trade) {
        match self.period_ms {
            Some(period) => {
                let bucket = trade.ts_ms.div_euclid(period) * period;
                self.bars
                    .entry(bucket)
                    .or_insert_with(|| BarInProgress::new(bucket))
                    .add_trade(trade.price, trade.size);
            }
            None => self.ticks.push(Bar {
                ts_ms: trade.ts_ms,
                open: trade.price,
                high: trade.price,
                low: trade.price,
                close: trade.price,
                volume: trade.size,
            }),
        }
    }

    /// Add multiple trades.
    pub fn add_trades(&mut self, trades: &[Trade]) {
        for trade in trades {
            self.add_trade(trade);
        }
    }

    /// Finalize every pending bar, ordered by time.
    pub fn finish(&mut self) -> Vec<Bar> {
        let mut completed: Vec<Bar> = std::mem::take(&mut self.bars)
            .values()
            .filter_map(BarInProgress::to_bar)
            .collect();
        completed.append(&mut self.ticks);
        completed.sort_by_key(|b| b.ts_ms);
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade(ts_ms: i64, price: f64, size: f64) -> Trade {
        Trade { ts_ms, price, size }
    }

    #[test]
    fn test_multiple_trades_same_minute() {
        let mut builder = BarBuilder::new(Granularity::Minute);

        builder.add_trade(&make_trade(60_000 + 10_000, 50000.0, 0.1)); // Open
        builder.add_trade(&make_trade(60_000 + 20_000, 50005.0, 0.2)); // High
        builder.add_trade(&make_trade(60_000 + 30_000, 49995.0, 0.1)); // Low
        builder.add_trade(&make_trade(60_000 + 50_000, 50001.0, 0.1)); // Close

        let bars = builder.finish();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].ts_ms, 60_000);
        assert!((bars[0].open - 50000.0).abs() < 1e-10);
        assert!((bars[0].high - 50005.0).abs() < 1e-10);
        assert!((bars[0].low - 49995.0).abs() < 1e-10);
        assert!((bars[0].close - 50001.0).abs() < 1e-10);
        assert!((bars[0].volume - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_second_bars() {
        let trades = [
            make_trade(1_000, 10.0, 1.0),
            make_trade(1_500, 11.0, 1.0),
            make_trade(2_100, 12.0, 2.0),
        ];
        let bars = BarBuilder::build(Granularity::Second, &trades);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].ts_ms, 1_000);
        assert!((bars[0].close - 11.0).abs() < 1e-10);
        assert_eq!(bars[1].ts_ms, 2_000);
        assert!((bars[1].volume - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_tick_bars_keep_every_trade() {
        let trades = [
            make_trade(1_000, 10.0, 1.0),
            make_trade(1_000, 10.5, 3.0),
            make_trade(1_001, 10.25, 2.0),
        ];
        let bars = BarBuilder::build(Granularity::Tick, &trades);

        assert_eq!(bars.len(), 3);
        assert!((bars[1].close - 10.5).abs() < 1e-10);
        assert!((bars[1].volume - 3.0).abs() < 1e-10);
    }
}
