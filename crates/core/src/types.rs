//! Core data types for the volume-profile engine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Size/quantity type.
pub type Size = f64;

/// A single trade (print) from the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Timestamp in milliseconds.
    pub ts_ms: TimestampMs,
    /// Trade price.
    pub price: f64,
    /// Trade size.
    pub size: Size,
}

/// OHLCV bar snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open timestamp (ms).
    pub ts_ms: TimestampMs,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Total volume.
    pub volume: Size,
}

impl Bar {
    /// Typical price: (high + low + close) / 3.
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Direction of the bar body.
    #[inline]
    pub fn side(&self) -> TradeSide {
        if self.close > self.open {
            TradeSide::Buy
        } else if self.close < self.open {
            TradeSide::Sell
        } else {
            TradeSide::Ambiguous
        }
    }

    /// Reject bars no source should produce.
    pub fn validate(&self) -> Result<()> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(Error::data(format!("bar at {} has a non-finite price", self.ts_ms)));
        }
        if self.high < self.low {
            return Err(Error::data(format!(
                "bar at {} has high {} below low {}",
                self.ts_ms, self.high, self.low
            )));
        }
        if self.volume.is_nan() || self.volume < 0.0 {
            return Err(Error::data(format!(
                "bar at {} has invalid volume {}",
                self.ts_ms, self.volume
            )));
        }
        Ok(())
    }
}

/// Inferred aggressor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum TradeSide {
    /// Buyer-initiated (uptick or up bar).
    Buy = 1,
    /// Seller-initiated (downtick or down bar).
    Sell = -1,
    /// No direction (zero tick, doji, or first print).
    Ambiguous = 0,
}

impl TradeSide {
    /// Split a volume into (buy, sell) components.
    ///
    /// Ambiguous volume is split evenly between both sides.
    #[inline]
    pub fn split(self, volume: Size) -> (Size, Size) {
        match self {
            TradeSide::Buy => (volume, 0.0),
            TradeSide::Sell => (0.0, volume),
            TradeSide::Ambiguous => (volume / 2.0, volume / 2.0),
        }
    }
}

/// Instrument metadata needed for price discretisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Trading symbol.
    pub symbol: String,
    /// Tick size (minimum price increment).
    pub tick_size: f64,
}

impl SymbolInfo {
    /// Create symbol info.
    pub fn new(symbol: impl Into<String>, tick_size: f64) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size,
        }
    }

    /// Round a price to the nearest tick.
    #[inline]
    pub fn round_to_tick(&self, price: f64) -> f64 {
        (price / self.tick_size).round() * self.tick_size
    }

    /// Integer tick index of a price.
    #[inline]
    pub fn price_to_tick(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }
}

/// Granularity of the bars that feed the binner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// The chart's own bars (OHLC spread across levels).
    Chart,
    /// One-minute bars fetched independently.
    Minute,
    /// One-second bars fetched independently.
    Second,
    /// Individual ticks.
    Tick,
}

impl Granularity {
    /// Bucket width in milliseconds, `None` for chart bars and ticks.
    pub fn period_ms(self) -> Option<i64> {
        match self {
            Granularity::Minute => Some(60_000),
            Granularity::Second => Some(1_000),
            Granularity::Chart | Granularity::Tick => None,
        }
    }

    /// Whether volume is placed at close prices of finer bars.
    pub fn is_fine(self) -> bool {
        !matches!(self, Granularity::Chart)
    }
}

/// How the price range is split into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLayout {
    /// Divide the range into exactly n rows.
    Count(u32),
    /// Each row spans k ticks.
    Ticks(u32),
}

/// Side of the chart the histogram is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistogramPlacement {
    Left,
    Right,
}

/// Period after which anchored accumulation restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorPeriod {
    /// Never reset.
    None,
    /// Reset on each trading session.
    Session,
    /// Reset on each calendar day.
    Day,
    /// Reset on each ISO week.
    Week,
    /// Reset on each calendar month.
    Month,
}

/// Identifies one of the three VWAP deviation bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandId {
    First,
    Second,
    Third,
}

impl BandId {
    /// All bands in order.
    pub const ALL: [BandId; 3] = [BandId::First, BandId::Second, BandId::Third];

    /// Array index of this band.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            BandId::First => 0,
            BandId::Second => 1,
            BandId::Third => 2,
        }
    }
}

/// Line style for band rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// Immutable description of one deviation band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    /// Deviation multiplier.
    pub multiplier: f64,
    /// RGBA color.
    pub color: [u8; 4],
    /// Line thickness in pixels.
    pub thickness: f32,
    /// Line style.
    pub style: LineStyle,
}

impl BandSpec {
    /// Band with the given multiplier and default styling.
    pub fn with_multiplier(multiplier: f64) -> Self {
        Self {
            multiplier,
            color: [128, 128, 128, 255],
            thickness: 1.0,
            style: LineStyle::Dashed,
        }
    }
}

/// One price level of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBin {
    /// Integer tick index of the bin center.
    pub tick_index: i64,
    /// Lower edge price.
    pub min_price: f64,
    /// Upper edge price.
    pub max_price: f64,
    /// Bin center price.
    pub mid_price: f64,
    /// Volume attributed to buyers.
    pub buy_volume: Size,
    /// Volume attributed to sellers.
    pub sell_volume: Size,
    /// Whether the bin lies inside the Value Area.
    pub in_value_area: bool,
}

impl PriceBin {
    /// Create an empty bin spanning [min_price, max_price).
    pub fn new(tick_index: i64, min_price: f64, max_price: f64) -> Self {
        Self {
            tick_index,
            min_price,
            max_price,
            mid_price: (min_price + max_price) / 2.0,
            buy_volume: 0.0,
            sell_volume: 0.0,
            in_value_area: false,
        }
    }

    /// Total volume (buy + sell).
    #[inline]
    pub fn total_volume(&self) -> Size {
        self.buy_volume + self.sell_volume
    }

    /// Buy minus sell volume.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.buy_volume - self.sell_volume
    }

    /// Add volume on the given side.
    #[inline]
    pub fn add(&mut self, side: TradeSide, volume: Size) {
        let (buy, sell) = side.split(volume);
        self.buy_volume += buy;
        self.sell_volume += sell;
    }
}
