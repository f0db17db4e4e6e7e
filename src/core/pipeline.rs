use std::path::{Path, PathBuf};

use crate::core::area::{estimate_area_for_profile, mask_statistics, AreaEstimate, MaskStatistics};
use crate::core::classifier::{FloodClassifier, FloodDetectionParams};
use crate::core::report::FloodReport;
use crate::io::{MaskWriter, RasterReader};
use crate::types::{FloodMask, FloodResult, Modality, RasterProfile};

/// Outcome of one raster-to-area run
#[derive(Debug, Clone)]
pub struct FloodDetection {
    pub source: PathBuf,
    pub modality: Modality,
    pub mask: FloodMask,
    pub profile: RasterProfile,
    pub statistics: MaskStatistics,
    pub area: AreaEstimate,
}

impl FloodDetection {
    pub fn area_km2(&self) -> f64 {
        self.area.area_km2
    }

    /// Summary for the reporting layer
    pub fn report(&self, params: &FloodDetectionParams) -> FloodReport {
        FloodReport::new(self, params)
    }

    /// Persist the mask as a GeoTIFF aligned with the source raster
    pub fn write_mask<P: AsRef<Path>>(&self, path: P) -> FloodResult<()> {
        MaskWriter::write_geotiff(path, &self.mask, &self.profile)
    }
}

/// Loader -> classifier -> area estimator for a single raster
#[derive(Debug, Clone)]
pub struct FloodDetector {
    classifier: FloodClassifier,
}

impl FloodDetector {
    pub fn new(params: FloodDetectionParams) -> FloodResult<Self> {
        Ok(Self {
            classifier: FloodClassifier::new(params)?,
        })
    }

    pub fn standard() -> Self {
        Self {
            classifier: FloodClassifier::standard(),
        }
    }

    pub fn params(&self) -> &FloodDetectionParams {
        self.classifier.params()
    }

    pub fn detect<P: AsRef<Path>>(&self, path: P, modality: Modality) -> FloodResult<FloodDetection> {
        let path = path.as_ref();
        log::info!("Starting {} flood detection for {}", modality, path.display());

        // Bands are dropped once the mask exists; only the mask is kept
        let (bands, profile) = RasterReader::open_raster(path)?;
        let mask = self.classifier.classify(&bands, modality)?;
        drop(bands);

        let statistics = mask_statistics(&mask)?;
        let area = estimate_area_for_profile(&mask, &profile, self.params().default_pixel_size_m)?;

        log::info!(
            "Flood detection complete: {} flood pixels ({:.2}%), {} km²",
            statistics.flood_pixels, statistics.flood_percentage, area.area_km2
        );

        Ok(FloodDetection {
            source: path.to_path_buf(),
            modality,
            mask,
            profile,
            statistics,
            area,
        })
    }
}

/// Run the full pipeline with explicit thresholds
pub fn detect_flood<P: AsRef<Path>>(
    path: P,
    modality: Modality,
    sar_threshold: f64,
    optical_threshold: f64,
) -> FloodResult<FloodDetection> {
    FloodDetector::new(FloodDetectionParams {
        sar_threshold_db: sar_threshold,
        optical_threshold,
        ..FloodDetectionParams::default()
    })?
    .detect(path, modality)
}
