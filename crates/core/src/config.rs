//! Configuration structures for the volume-profile engine.

use crate::{
    AnchorPeriod, BandId, BandSpec, Error, Granularity, HistogramPlacement, Result, RowLayout,
    SymbolInfo,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on the number of rows in one profile.
pub const DEFAULT_MAX_ROWS: u32 = 500;

/// Main configuration for a profile study.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrument configuration.
    pub instrument: InstrumentConfig,
    /// Profile layout and value area configuration.
    pub profile: ProfileConfig,
    /// Anchored VWAP configuration.
    pub vwap: VwapConfig,
    /// Session calendar configuration.
    pub session: SessionConfig,
}

impl Config {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.instrument.validate()?;
        self.profile.validate()?;
        self.vwap.validate()
    }
}

/// Instrument-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Trading symbol (e.g., "ES").
    pub symbol: String,
    /// Tick size (minimum price increment).
    pub tick_size: f64,
}

impl InstrumentConfig {
    /// Symbol info for this instrument.
    pub fn symbol_info(&self) -> SymbolInfo {
        SymbolInfo::new(self.symbol.clone(), self.tick_size)
    }

    fn validate(&self) -> Result<()> {
        if !(self.tick_size.is_finite() && self.tick_size > 0.0) {
            return Err(Error::config(format!(
                "tick_size must be positive, got {}",
                self.tick_size
            )));
        }
        Ok(())
    }
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: "ES".to_string(),
            tick_size: 0.25,
        }
    }
}

/// Profile layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Row layout mode.
    pub layout: RowLayout,
    /// Maximum number of rows.
    pub max_rows: u32,
    /// Target Value Area coverage in percent (e.g., 70.0).
    pub value_area_pct: f64,
    /// Histogram placement.
    pub placement: HistogramPlacement,
    /// Source granularity for volume placement.
    pub granularity: Granularity,
}

impl ProfileConfig {
    fn validate(&self) -> Result<()> {
        match self.layout {
            RowLayout::Count(0) => return Err(Error::config("row count must be at least 1")),
            RowLayout::Ticks(0) => return Err(Error::config("ticks per row must be at least 1")),
            _ => {}
        }
        if self.max_rows == 0 {
            return Err(Error::config("max_rows must be at least 1"));
        }
        if !(self.value_area_pct > 0.0 && self.value_area_pct <= 100.0) {
            return Err(Error::config(format!(
                "value_area_pct must be in (0, 100], got {}",
                self.value_area_pct
            )));
        }
        Ok(())
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            layout: RowLayout::Ticks(1),
            max_rows: DEFAULT_MAX_ROWS,
            value_area_pct: 70.0,
            placement: HistogramPlacement::Right,
            granularity: Granularity::Chart,
        }
    }
}

/// Settings for one deviation band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSettings {
    /// Whether the band is drawn.
    pub enabled: bool,
    /// Band description.
    pub spec: BandSpec,
}

/// Anchored VWAP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapConfig {
    /// Whether VWAP is computed.
    pub enabled: bool,
    /// Reset period.
    pub anchor: AnchorPeriod,
    /// Band settings indexed by `BandId`.
    pub bands: [BandSettings; 3],
}

impl VwapConfig {
    /// Settings for one band.
    pub fn band(&self, id: BandId) -> &BandSettings {
        &self.bands[id.index()]
    }

    /// Enabled band specs indexed by `BandId`.
    pub fn active_bands(&self) -> [Option<BandSpec>; 3] {
        self.bands.map(|b| b.enabled.then_some(b.spec))
    }

    fn validate(&self) -> Result<()> {
        for id in BandId::ALL {
            let multiplier = self.band(id).spec.multiplier;
            if !(multiplier.is_finite() && multiplier >= 0.0) {
                return Err(Error::config(format!(
                    "band {id:?} multiplier must be finite and non-negative, got {multiplier}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for VwapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            anchor: AnchorPeriod::Session,
            bands: [1.0, 2.0, 3.0].map(|m| BandSettings {
                enabled: true,
                spec: BandSpec::with_multiplier(m),
            }),
        }
    }
}

/// Session calendar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Exchange offset from UTC in minutes (east positive).
    pub utc_offset_minutes: i32,
    /// Session open as minutes after local midnight.
    pub session_open_minutes: u32,
}
