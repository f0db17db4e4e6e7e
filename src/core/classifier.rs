use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::band_convention::{BandConvention, SensorProduct, WaterIndexKind};
use crate::core::water_index::{ndwi, DEFAULT_EPSILON};
use crate::types::{BandArray, FloodError, FloodMask, FloodResult, Modality, WaterIndex};

/// Default SAR backscatter threshold (dB); darker pixels are water
pub const DEFAULT_SAR_THRESHOLD_DB: f64 = -15.0;

/// Default optical water index threshold; higher values are water
pub const DEFAULT_OPTICAL_THRESHOLD: f64 = 0.3;

/// Pixel side length used when the raster's ground resolution is unknown
pub const DEFAULT_PIXEL_SIZE_M: f64 = 10.0;

/// Flood detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodDetectionParams {
    /// SAR: pixel is flood iff backscatter < threshold
    pub sar_threshold_db: f64,
    /// Optical: pixel is flood iff water index > threshold
    pub optical_threshold: f64,
    /// Normalized difference denominator offset
    pub epsilon: f64,
    /// Band ordering of optical inputs
    pub sensor: SensorProduct,
    /// Optical index variant (NIR or SWIR based)
    pub water_index: WaterIndexKind,
    /// Square pixel size used for area when the profile has no usable resolution
    pub default_pixel_size_m: f64,
}

impl Default for FloodDetectionParams {
    fn default() -> Self {
        Self {
            sar_threshold_db: DEFAULT_SAR_THRESHOLD_DB,
            optical_threshold: DEFAULT_OPTICAL_THRESHOLD,
            epsilon: DEFAULT_EPSILON,
            sensor: SensorProduct::default(),
            water_index: WaterIndexKind::default(),
            default_pixel_size_m: DEFAULT_PIXEL_SIZE_M,
        }
    }
}

impl FloodDetectionParams {
    /// Parse parameters from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> FloodResult<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| FloodError::Serialization(format!("invalid parameter file: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> FloodResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> FloodResult<()> {
        if !self.sar_threshold_db.is_finite() {
            return Err(FloodError::InvalidParameter(format!(
                "sar_threshold_db must be finite, got {}",
                self.sar_threshold_db
            )));
        }
        if !self.optical_threshold.is_finite() {
            return Err(FloodError::InvalidParameter(format!(
                "optical_threshold must be finite, got {}",
                self.optical_threshold
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(FloodError::InvalidParameter(format!(
                "epsilon must be a small positive number, got {}",
                self.epsilon
            )));
        }
        if !(self.default_pixel_size_m.is_finite() && self.default_pixel_size_m > 0.0) {
            return Err(FloodError::InvalidParameter(format!(
                "default_pixel_size_m must be positive, got {}",
                self.default_pixel_size_m
            )));
        }
        Ok(())
    }
}

/// Threshold-based flood classifier for SAR and optical rasters
#[derive(Debug, Clone)]
pub struct FloodClassifier {
    params: FloodDetectionParams,
}

impl FloodClassifier {
    pub fn new(params: FloodDetectionParams) -> FloodResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Classifier with the standard thresholds (-15 dB, 0.3)
    pub fn standard() -> Self {
        Self {
            params: FloodDetectionParams::default(),
        }
    }

    pub fn params(&self) -> &FloodDetectionParams {
        &self.params
    }

    /// Classify every pixel as flood (1) or dry (0).
    ///
    /// SAR flags pixels strictly below the dB threshold, optical flags
    /// pixels whose water index is strictly above its threshold. NaN is
    /// never flood. The mask has the shape of the input bands.
    pub fn classify(&self, bands: &[BandArray], modality: Modality) -> FloodResult<FloodMask> {
        let mask = match modality {
            Modality::Sar => {
                let backscatter = Self::sar_band(bands)?;
                log::info!(
                    "Classifying {}x{} SAR raster (threshold {} dB)",
                    backscatter.nrows(), backscatter.ncols(), self.params.sar_threshold_db
                );
                threshold_below(backscatter, self.params.sar_threshold_db)
            }
            Modality::Optical => {
                let index = self.optical_index(bands)?;
                log::info!(
                    "Classifying {}x{} optical raster ({} > {})",
                    index.nrows(), index.ncols(), self.params.water_index, self.params.optical_threshold
                );
                threshold_above(&index, self.params.optical_threshold)
            }
        };

        log::debug!(
            "Flood pixels: {} of {}",
            mask.iter().filter(|&&v| v == 1).count(),
            mask.len()
        );
        Ok(mask)
    }

    /// Per-pixel water index the mask is thresholded from
    pub fn water_index(&self, bands: &[BandArray], modality: Modality) -> FloodResult<WaterIndex> {
        match modality {
            Modality::Sar => Ok(Self::sar_band(bands)?.clone()),
            Modality::Optical => self.optical_index(bands),
        }
    }

    fn sar_band(bands: &[BandArray]) -> FloodResult<&BandArray> {
        bands.first().ok_or(FloodError::InsufficientBands {
            modality: Modality::Sar,
            required: 1,
            available: 0,
        })
    }

    fn optical_index(&self, bands: &[BandArray]) -> FloodResult<WaterIndex> {
        let convention = BandConvention::for_sensor(self.params.sensor);
        let (green_idx, water_idx) = convention.resolve(self.params.water_index, bands.len())?;

        log::debug!(
            "{} band convention: green = band {}, water = band {}",
            self.params.sensor, green_idx, water_idx
        );

        ndwi(&bands[green_idx], &bands[water_idx], self.params.epsilon)
    }
}

/// 1 where `value < threshold`
pub fn threshold_below(data: &Array2<f64>, threshold: f64) -> FloodMask {
    data.mapv(|v| u8::from(v < threshold))
}

/// 1 where `value > threshold`
pub fn threshold_above(data: &Array2<f64>, threshold: f64) -> FloodMask {
    data.mapv(|v| u8::from(v > threshold))
}

/// Classify with the default band convention and the given thresholds
pub fn classify(
    bands: &[BandArray],
    modality: Modality,
    sar_threshold: f64,
    optical_threshold: f64,
) -> FloodResult<FloodMask> {
    let classifier = FloodClassifier::new(FloodDetectionParams {
        sar_threshold_db: sar_threshold,
        optical_threshold,
        ..FloodDetectionParams::default()
    })?;
    classifier.classify(bands, modality)
}
