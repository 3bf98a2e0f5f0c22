//! Tick-rule direction inference for fine bars.
//!
//! Classifies each fine bar (or tick) as buy- or sell-initiated by comparing its
//! close with the close of the previous fine bar. Unchanged closes and the very
//! first bar carry no direction and are split evenly by the binner.

use profile_core::{Bar, Size, TradeSide};

/// Statistics about classification results.
#[derive(Debug, Clone, Default)]
pub struct ClassificationStats {
    /// Total bars classified.
    pub total_bars: u64,
    /// Bars classified as buy.
    pub buy_bars: u64,
    /// Bars classified as sell.
    pub sell_bars: u64,
    /// Bars classified as ambiguous.
    pub ambiguous_bars: u64,
    /// Total volume processed.
    pub total_volume: Size,
    /// Buy volume.
    pub buy_volume: Size,
    /// Sell volume.
    pub sell_volume: Size,
    /// Ambiguous volume.
    pub ambiguous_volume: Size,
}

impl ClassificationStats {
    /// Get the fraction of ambiguous volume.
    pub fn ambiguous_frac(&self) -> f64 {
        if self.total_volume > 0.0 {
            self.ambiguous_volume / self.total_volume
        } else {
            0.0
        }
    }

    fn record(&mut self, side: TradeSide, volume: Size) {
        self.total_bars += 1;
        self.total_volume += volume;
        match side {
            TradeSide::Buy => {
                self.buy_bars += 1;
                self.buy_volume += volume;
            }
            TradeSide::Sell => {
                self.sell_bars += 1;
                self.sell_volume += volume;
            }
            TradeSide::Ambiguous => {
                self.ambiguous_bars += 1;
                self.ambiguous_volume += volume;
            }
        }
    }
}

/// Tick-rule classifier over a stream of fine bars.
#[derive(Debug, Clone, Default)]
pub struct TickRuleClassifier {
    /// Close of the previous fine bar.
    last_close: Option<f64>,
    /// Classification statistics.
    stats: ClassificationStats,
}

impl TickRuleClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next fine bar.
    pub fn classify(&mut self, bar: &Bar) -> TradeSide {
        let side = match self.last_close {
            Some(prev) if bar.close > prev => TradeSide::Buy,
            Some(prev) if bar.close < prev => TradeSide::Sell,
            _ => TradeSide::Ambiguous,
        };

        self.stats.record(side, bar.volume);
        self.last_close = Some(bar.close);
        side
    }

    /// Get classification statistics.
    pub fn stats(&self) -> &ClassificationStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tick(ts_ms: i64, price: f64, volume: f64) -> Bar {
        Bar {
            ts_ms,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    #[test]
    fn test_first_bar_is_ambiguous() {
        let mut classifier = TickRuleClassifier::new();
        assert_eq!(classifier.classify(&make_tick(0, 100.0, 1.0)), TradeSide::Ambiguous);
    }

    #[test]
    fn test_up_down_and_tie() {
        let mut classifier = TickRuleClassifier::new();
        classifier.classify(&make_tick(0, 100.0, 1.0));

        assert_eq!(classifier.classify(&make_tick(1, 100.25, 2.0)), TradeSide::Buy);
        assert_eq!(classifier.classify(&make_tick(2, 100.0, 3.0)), TradeSide::Sell);
        // Zero tick splits evenly rather than continuing the last side
        assert_eq!(classifier.classify(&make_tick(3, 100.0, 4.0)), TradeSide::Ambiguous);
    }

    #[test]
    fn test_stats() {
        let mut classifier = TickRuleClassifier::new();
        for (i, (price, vol)) in [(100.0, 10.0), (101.0, 20.0), (100.5, 30.0), (100.5, 40.0)]
            .iter()
            .enumerate()
        {
            classifier.classify(&make_tick(i as i64, *price, *vol));
        }

        let stats = classifier.stats();
        assert_eq!(stats.total_bars, 4);
        assert_eq!(stats.buy_bars, 1);
        assert_eq!(stats.sell_bars, 1);
        assert_eq!(stats.ambiguous_bars, 2);
        assert!((stats.ambiguous_frac() - 0.5).abs() < 1e-10);
    }
}
