//! floodscan: flood extent mapping from georeferenced satellite rasters
//!
//! Loads a SAR or optical raster through GDAL, thresholds a per-pixel
//! water index into a binary flood mask aligned with the input, and
//! converts the flooded pixel count into square kilometers.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    BandArray, Bounds, CrsInfo, FloodError, FloodMask, FloodResult, GeoTransform, Modality,
    RasterProfile, WaterIndex,
};

pub use io::{open_raster, MaskWriter, RasterReader};
pub use crate::core::{
    classify, detect_flood, estimate_area, estimate_area_for_profile, FloodClassifier,
    FloodDetection, FloodDetectionParams, FloodDetector, FloodReport, SensorProduct,
    WaterIndexKind,
};
