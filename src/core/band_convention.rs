use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{FloodError, FloodResult, Modality};

/// Minimum band count for any optical classification
pub const MIN_OPTICAL_BANDS: usize = 4;

/// Sensor/product band orderings with a known band-index convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorProduct {
    /// Blue, Green, Red, NIR (4-band composites such as PlanetScope)
    Generic4Band,
    /// Sentinel-2 Level-1C, 13 bands B1..B12 including B8A and B10
    Sentinel2L1C,
    /// Sentinel-2 Level-2A, 12 bands (B10 dropped)
    Sentinel2L2A,
    /// Landsat 8/9 OLI, bands B1..B7
    Landsat8Oli,
}

impl Default for SensorProduct {
    fn default() -> Self {
        SensorProduct::Generic4Band
    }
}

impl fmt::Display for SensorProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorProduct::Generic4Band => "generic4band",
            SensorProduct::Sentinel2L1C => "sentinel2l1c",
            SensorProduct::Sentinel2L2A => "sentinel2l2a",
            SensorProduct::Landsat8Oli => "landsat8oli",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SensorProduct {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "generic4band" | "generic" => Ok(SensorProduct::Generic4Band),
            "sentinel2l1c" => Ok(SensorProduct::Sentinel2L1C),
            "sentinel2l2a" | "sentinel2" => Ok(SensorProduct::Sentinel2L2A),
            "landsat8oli" | "landsat8" | "landsat9" => Ok(SensorProduct::Landsat8Oli),
            _ => Err(FloodError::InvalidParameter(format!("unknown sensor product '{}'", s))),
        }
    }
}

/// Optical water index variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterIndexKind {
    /// McFeeters NDWI, green vs near-infrared
    Ndwi,
    /// Xu MNDWI, green vs short-wave infrared
    Mndwi,
}

impl Default for WaterIndexKind {
    fn default() -> Self {
        WaterIndexKind::Ndwi
    }
}

impl fmt::Display for WaterIndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaterIndexKind::Ndwi => write!(f, "ndwi"),
            WaterIndexKind::Mndwi => write!(f, "mndwi"),
        }
    }
}

impl FromStr for WaterIndexKind {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ndwi" => Ok(WaterIndexKind::Ndwi),
            "mndwi" => Ok(WaterIndexKind::Mndwi),
            _ => Err(FloodError::InvalidParameter(format!("unknown water index '{}'", s))),
        }
    }
}

/// Zero-based band positions for one sensor product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandConvention {
    pub sensor: SensorProduct,
    /// Band count of a complete product
    pub band_count: usize,
    pub green: usize,
    pub nir: usize,
    pub swir: Option<usize>,
}

/// Lookup table of supported band conventions
pub static BAND_CONVENTIONS: [BandConvention; 4] = [
    BandConvention {
        sensor: SensorProduct::Generic4Band,
        band_count: 4,
        green: 1,
        nir: 3,
        swir: None,
    },
    BandConvention {
        sensor: SensorProduct::Sentinel2L1C,
        band_count: 13,
        green: 2,  // B3
        nir: 7,    // B8
        swir: Some(11), // B11
    },
    BandConvention {
        sensor: SensorProduct::Sentinel2L2A,
        band_count: 12,
        green: 2,  // B3
        nir: 7,    // B8
        swir: Some(10), // B11
    },
    BandConvention {
        sensor: SensorProduct::Landsat8Oli,
        band_count: 7,
        green: 2,  // B3
        nir: 4,    // B5
        swir: Some(5), // B6
    },
];

impl BandConvention {
    pub fn for_sensor(sensor: SensorProduct) -> &'static BandConvention {
        // Every SensorProduct variant has exactly one table row
        BAND_CONVENTIONS
            .iter()
            .find(|c| c.sensor == sensor)
            .unwrap_or(&BAND_CONVENTIONS[0])
    }

    /// Index of the water-absorbing band for the requested index variant
    pub fn water_band(&self, kind: WaterIndexKind) -> FloodResult<usize> {
        match kind {
            WaterIndexKind::Ndwi => Ok(self.nir),
            WaterIndexKind::Mndwi => self.swir.ok_or_else(|| FloodError::UnsupportedIndex {
                index: kind.to_string(),
                sensor: self.sensor.to_string(),
            }),
        }
    }

    /// Resolve (green, water) band indices and check them against the
    /// available band count.
    ///
    /// The required count is the larger of the optical minimum and the
    /// highest referenced index plus one.
    pub fn resolve(&self, kind: WaterIndexKind, available: usize) -> FloodResult<(usize, usize)> {
        let water = self.water_band(kind)?;
        let required = MIN_OPTICAL_BANDS.max(self.green.max(water) + 1);

        if available < required {
            return Err(FloodError::InsufficientBands {
                modality: Modality::Optical,
                required,
                available,
            });
        }

        if available < self.band_count {
            log::debug!(
                "{} raster has {} of {} bands, using green={} water={}",
                self.sensor, available, self.band_count, self.green, water
            );
        }

        Ok((self.green, water))
    }
}
