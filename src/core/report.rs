//! Flood report summary
//!
//! Everything the external reporting layer needs to render a flood map
//! and its caption: where the mask sits on the ground, how it was derived
//! and how much area it covers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::area::{AreaEstimate, MaskStatistics};
use crate::core::band_convention::{SensorProduct, WaterIndexKind};
use crate::core::classifier::FloodDetectionParams;
use crate::core::pipeline::FloodDetection;
use crate::types::{Bounds, FloodError, FloodResult, GeoTransform, Modality};

/// Threshold rule that produced the mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
pub enum ClassificationSummary {
    Sar {
        threshold_db: f64,
    },
    Optical {
        sensor: SensorProduct,
        water_index: WaterIndexKind,
        threshold: f64,
        epsilon: f64,
    },
}

impl ClassificationSummary {
    fn new(modality: Modality, params: &FloodDetectionParams) -> Self {
        match modality {
            Modality::Sar => ClassificationSummary::Sar {
                threshold_db: params.sar_threshold_db,
            },
            Modality::Optical => ClassificationSummary::Optical {
                sensor: params.sensor,
                water_index: params.water_index,
                threshold: params.optical_threshold,
                epsilon: params.epsilon,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodReport {
    pub source: String,
    pub processed_at: DateTime<Utc>,
    pub processor_version: String,
    pub classification: ClassificationSummary,
    pub rows: usize,
    pub cols: usize,
    pub crs_epsg: Option<u32>,
    pub geo_transform: GeoTransform,
    pub bounds: Bounds,
    pub statistics: MaskStatistics,
    pub area: AreaEstimate,
}

impl FloodReport {
    pub fn new(detection: &FloodDetection, params: &FloodDetectionParams) -> Self {
        let profile = &detection.profile;
        Self {
            source: detection.source.display().to_string(),
            processed_at: Utc::now(),
            processor_version: env!("CARGO_PKG_VERSION").to_string(),
            classification: ClassificationSummary::new(detection.modality, params),
            rows: profile.height,
            cols: profile.width,
            crs_epsg: profile.crs.as_ref().and_then(|crs| crs.epsg),
            geo_transform: profile.geo_transform,
            bounds: profile.bounds(),
            statistics: detection.statistics,
            area: detection.area,
        }
    }

    /// One-line caption, e.g. "Estimated Flooded Area: 12.5 sq.km"
    pub fn headline(&self) -> String {
        format!("Estimated Flooded Area: {:?} sq.km", self.area.area_km2)
    }

    pub fn to_json(&self) -> FloodResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FloodError::Serialization(format!("Report serialization failed: {}", e)))
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> FloodResult<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Flood report written to {}", path.as_ref().display());
        Ok(())
    }
}
