//! Core flood mapping modules

pub mod band_convention;
pub mod water_index;
pub mod classifier;
pub mod area;
pub mod pipeline;
pub mod report;

// Re-export main types
pub use band_convention::{BandConvention, SensorProduct, WaterIndexKind, BAND_CONVENTIONS, MIN_OPTICAL_BANDS};
pub use water_index::{ndwi, normalized_difference, DEFAULT_EPSILON};
pub use classifier::{
    classify, FloodClassifier, FloodDetectionParams,
    DEFAULT_OPTICAL_THRESHOLD, DEFAULT_PIXEL_SIZE_M, DEFAULT_SAR_THRESHOLD_DB,
};
pub use area::{
    estimate_area, estimate_area_default, estimate_area_for_profile, estimate_area_rect,
    mask_statistics, AreaEstimate, MaskStatistics,
};
pub use pipeline::{detect_flood, FloodDetection, FloodDetector};
pub use report::{ClassificationSummary, FloodReport};
