//! Core data types for flood mapping

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Single raster band, rows x cols, values widened to f64
pub type BandArray = Array2<f64>;

/// Per-pixel water index (raw backscatter for SAR, normalized difference for optical)
pub type WaterIndex = Array2<f64>;

/// Binary flood mask (1 = flood/water, 0 = dry)
pub type FloodMask = Array2<u8>;

/// Sensor modality used to pick the water detection algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Single-band radar backscatter (typically dB)
    Sar,
    /// Multi-band optical reflectance
    Optical,
}

impl Modality {
    pub const ACCEPTED: [&'static str; 2] = ["sar", "optical"];
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Sar => write!(f, "sar"),
            Modality::Optical => write!(f, "optical"),
        }
    }
}

impl FromStr for Modality {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sar" => Ok(Modality::Sar),
            "optical" => Ok(Modality::Optical),
            _ => Err(FloodError::InvalidModality(s.to_string())),
        }
    }
}

/// Geospatial transformation parameters (GDAL coefficient order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from the six GDAL coefficients
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Map the upper-left corner of pixel (row, col) to georeferenced (x, y)
    pub fn pixel_to_geo(&self, row: f64, col: f64) -> (f64, f64) {
        let x = self.top_left_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.top_left_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    /// True when the grid is axis-aligned (no rotation terms)
    pub fn is_north_up(&self) -> bool {
        self.rotation_x == 0.0 && self.rotation_y == 0.0
    }

    /// Extent covered by a rows x cols grid, taken over all four corners
    pub fn bounds(&self, rows: usize, cols: usize) -> Bounds {
        let corners = [
            self.pixel_to_geo(0.0, 0.0),
            self.pixel_to_geo(0.0, cols as f64),
            self.pixel_to_geo(rows as f64, 0.0),
            self.pixel_to_geo(rows as f64, cols as f64),
        ];

        let mut bounds = Bounds {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for (x, y) in corners {
            bounds.min_x = bounds.min_x.min(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_y = bounds.max_y.max(y);
        }
        bounds
    }
}

impl Default for GeoTransform {
    /// GDAL's default for rasters without georeferencing
    fn default() -> Self {
        Self::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }
}

/// Georeferenced extent in CRS units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Coordinate reference system summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsInfo {
    pub wkt: String,
    pub epsg: Option<u32>,
    pub is_projected: bool,
    /// Meters per CRS linear unit (1.0 for metric projections)
    pub linear_unit_meters: f64,
}

/// Geospatial metadata of an opened raster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterProfile {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub geo_transform: GeoTransform,
    pub crs: Option<CrsInfo>,
    /// GDAL data type name of each band as stored on disk
    pub band_types: Vec<String>,
    pub no_data: Vec<Option<f64>>,
    pub driver: String,
}

impl RasterProfile {
    /// Band shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn pixel_width(&self) -> f64 {
        self.geo_transform.pixel_width.abs()
    }

    pub fn pixel_height(&self) -> f64 {
        self.geo_transform.pixel_height.abs()
    }

    /// Ground pixel size (width, height) in meters.
    ///
    /// Only available for north-up rasters in a projected CRS; angular
    /// or missing units give `None`.
    pub fn ground_pixel_size(&self) -> Option<(f64, f64)> {
        let crs = self.crs.as_ref()?;
        if !crs.is_projected || !self.geo_transform.is_north_up() {
            return None;
        }

        let unit = crs.linear_unit_meters;
        let width = self.pixel_width() * unit;
        let height = self.pixel_height() * unit;
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Some((width, height))
        } else {
            None
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.geo_transform.bounds(self.height, self.width)
    }
}

/// Error types for flood mapping
#[derive(Debug, thiserror::Error)]
pub enum FloodError {
    #[error("Failed to open raster '{path}': {source}")]
    RasterOpen {
        path: String,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("Invalid raster format: {0}")]
    RasterFormat(String),

    #[error("{modality} classification requires at least {required} bands, but the raster has {available}")]
    InsufficientBands {
        modality: Modality,
        required: usize,
        available: usize,
    },

    #[error("Invalid modality '{0}'. Choose '{accepted}'", accepted = Modality::ACCEPTED.join("' or '"))]
    InvalidModality(String),

    #[error("Water index {index} is not supported by the {sensor} band convention")]
    UnsupportedIndex { index: String, sensor: String },

    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for flood mapping operations
pub type FloodResult<T> = Result<T, FloodError>;
