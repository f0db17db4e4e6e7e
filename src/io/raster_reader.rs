use crate::types::{BandArray, CrsInfo, FloodError, FloodResult, GeoTransform, RasterProfile};
use gdal::spatial_ref::SpatialRef;
use gdal::Dataset;
use ndarray::Array2;
use std::path::Path;

/// Reader for georeferenced rasters (GeoTIFF or anything GDAL can open)
pub struct RasterReader;

impl RasterReader {
    /// Read every band of a raster together with its profile.
    ///
    /// Bands are returned in storage order (index 0 = GDAL band 1) as
    /// rows x cols arrays. The dataset is closed before returning, on
    /// success and on error alike.
    pub fn open_raster<P: AsRef<Path>>(path: P) -> FloodResult<(Vec<BandArray>, RasterProfile)> {
        let path = path.as_ref();
        log::info!("Reading raster from: {}", path.display());

        let dataset = Self::open_dataset(path)?;
        let profile = Self::build_profile(&dataset)?;

        log::debug!(
            "Raster size: {}x{} ({} bands, driver {})",
            profile.width, profile.height, profile.band_count, profile.driver
        );
        log::debug!("Raster geotransform: {:?}", profile.geo_transform);

        let mut bands = Vec::with_capacity(profile.band_count);
        for band_index in 1..=profile.band_count {
            bands.push(Self::read_band(&dataset, band_index, profile.width, profile.height)?);
        }

        Ok((bands, profile))
    }

    /// Read only the raster profile, without touching pixel data
    pub fn read_profile<P: AsRef<Path>>(path: P) -> FloodResult<RasterProfile> {
        let dataset = Self::open_dataset(path.as_ref())?;
        Self::build_profile(&dataset)
    }

    fn open_dataset(path: &Path) -> FloodResult<Dataset> {
        Dataset::open(path).map_err(|source| FloodError::RasterOpen {
            path: path.display().to_string(),
            source,
        })
    }

    fn build_profile(dataset: &Dataset) -> FloodResult<RasterProfile> {
        let band_count = usize::try_from(dataset.raster_count()).unwrap_or(0);
        if band_count == 0 {
            return Err(FloodError::RasterFormat("raster contains no bands".to_string()));
        }

        let (width, height) = dataset.raster_size();
        if width == 0 || height == 0 {
            return Err(FloodError::RasterFormat(format!(
                "raster has empty dimensions {}x{}",
                width, height
            )));
        }

        // Rasters without georeferencing fall back to GDAL's identity transform
        let geo_transform = match dataset.geo_transform() {
            Ok(gt) => GeoTransform::from_gdal(gt),
            Err(e) => {
                log::warn!("Raster has no geotransform ({}), using identity", e);
                GeoTransform::default()
            }
        };

        let crs = dataset.spatial_ref().ok().and_then(|srs| Self::crs_info(&srs));

        let mut band_types = Vec::with_capacity(band_count);
        let mut no_data = Vec::with_capacity(band_count);
        for band_index in 1..=band_count {
            let band = dataset.rasterband(band_index as isize)?;
            band_types.push(format!("{:?}", band.band_type()));
            no_data.push(band.no_data_value());
        }

        Ok(RasterProfile {
            width,
            height,
            band_count,
            geo_transform,
            crs,
            band_types,
            no_data,
            driver: dataset.driver().short_name(),
        })
    }

    fn crs_info(srs: &SpatialRef) -> Option<CrsInfo> {
        let wkt = srs.to_wkt().ok()?;
        if wkt.is_empty() {
            return None;
        }

        Some(CrsInfo {
            wkt,
            epsg: srs.auth_code().ok().and_then(|code| u32::try_from(code).ok()),
            is_projected: srs.is_projected(),
            linear_unit_meters: srs.linear_units(),
        })
    }

    fn read_band(
        dataset: &Dataset,
        band_index: usize,
        width: usize,
        height: usize,
    ) -> FloodResult<BandArray> {
        let rasterband = dataset.rasterband(band_index as isize)?;
        let buffer = rasterband.read_as::<f64>((0, 0), (width, height), (width, height), None)?;

        Array2::from_shape_vec((height, width), buffer.data).map_err(|e| {
            FloodError::RasterFormat(format!("failed to reshape band {}: {}", band_index, e))
        })
    }
}

/// Open a raster and return `(bands, profile)`
pub fn open_raster<P: AsRef<Path>>(path: P) -> FloodResult<(Vec<BandArray>, RasterProfile)> {
    RasterReader::open_raster(path)
}
