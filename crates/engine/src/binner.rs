//! Volume binning.
//!
//! Attributes traded volume to the rows of a [`RowPlan`], split into buy and
//! sell components. Two modes:
//! - Bar mode spreads each chart bar's volume evenly over every row its
//!   `[low, high]` covers and assigns the side from the bar body.
//! - Fine mode places each finer bar's whole volume in the row holding its
//!   close, with the side from the tick rule.

use crate::layout::RowPlan;
use profile_core::{Bar, PriceBin, SymbolInfo};
use profile_ingestion::{ClassificationStats, TickRuleClassifier};

/// Accumulates volume into the rows of one profile.
pub struct VolumeBinner {
    plan: RowPlan,
    tick_size: f64,
    bins: Vec<PriceBin>,
    classifier: TickRuleClassifier,
}

impl VolumeBinner {
    /// Create a binner with one empty bin per planned row.
    pub fn new(plan: RowPlan, symbol: &SymbolInfo) -> Self {
        let bins = (0..plan.rows)
            .map(|level| {
                let (lower, upper) = plan.row_edges(level);
                PriceBin::new(symbol.price_to_tick((lower + upper) / 2.0), lower, upper)
            })
            .collect();

        Self {
            plan,
            tick_size: symbol.tick_size,
            bins,
            classifier: TickRuleClassifier::new(),
        }
    }

    /// Bin chart bars in one pass.
    pub fn bin_bars<I>(plan: RowPlan, symbol: &SymbolInfo, bars: I) -> Vec<PriceBin>
    where
        I: IntoIterator<Item = Bar>,
    {
        let mut binner = Self::new(plan, symbol);
        for bar in bars {
            binner.add_bar(&bar);
        }
        binner.finish()
    }

    /// Bin finer bars (or ticks) in one pass.
    ///
    /// Also returns the tick-rule statistics over every fine bar seen.
    pub fn bin_fine<I>(
        plan: RowPlan,
        symbol: &SymbolInfo,
        fine_bars: I,
    ) -> (Vec<PriceBin>, ClassificationStats)
    where
        I: IntoIterator<Item = Bar>,
    {
        let mut binner = Self::new(plan, symbol);
        for bar in fine_bars {
            binner.add_fine_bar(&bar);
        }
        let stats = binner.classification().clone();
        (binner.finish(), stats)
    }

    /// Spread a chart bar's volume evenly across the rows it covers.
    pub fn add_bar(&mut self, bar: &Bar) {
        if bar.volume <= 0.0 {
            return;
        }

        let (start, end) = self.plan.level_span(bar.low, bar.high, self.tick_size);
        let per_level = bar.volume / (end - start + 1) as f64;
        let side = bar.side();

        for bin in &mut self.bins[start..=end] {
            bin.add(side, per_level);
        }
    }

    /// Place a finer bar's volume at its close.
    ///
    /// Every bar advances the tick rule, but only closes inside the profile's
    /// price range contribute volume.
    pub fn add_fine_bar(&mut self, bar: &Bar) {
        let side = self.classifier.classify(bar);
        if bar.volume <= 0.0 || !self.plan.contains(bar.close, self.tick_size) {
            return;
        }

        let level = self.plan.level_of(bar.close);
        self.bins[level].add(side, bar.volume);
    }

    /// Tick-rule statistics of the fine bars added so far.
    pub fn classification(&self) -> &ClassificationStats {
        self.classifier.stats()
    }

    /// Consume the binner and return the bins, ascending by price.
    pub fn finish(self) -> Vec<PriceBin> {
        self.bins
    }
}
