use crate::types::{FloodError, FloodMask, FloodResult, GeoTransform, RasterProfile};
use gdal::raster::Buffer;
use gdal::DriverManager;
use std::path::Path;

/// Writes a computed flood mask as a single-band Byte GeoTIFF
pub struct MaskWriter;

impl MaskWriter {
    /// Write `mask` to `path`, georeferenced with the source raster's
    /// transform and CRS so it overlays the input pixel-for-pixel.
    pub fn write_geotiff<P: AsRef<Path>>(
        path: P,
        mask: &FloodMask,
        profile: &RasterProfile,
    ) -> FloodResult<()> {
        let path = path.as_ref();
        let (rows, cols) = mask.dim();
        if (rows, cols) != profile.shape() {
            return Err(FloodError::ShapeMismatch {
                expected: profile.shape(),
                found: (rows, cols),
            });
        }

        Self::write_with_georef(
            path,
            mask,
            &profile.geo_transform,
            profile.crs.as_ref().map(|crs| crs.wkt.as_str()),
        )
    }

    /// Write `mask` with an explicit transform and optional CRS WKT
    pub fn write_with_georef<P: AsRef<Path>>(
        path: P,
        mask: &FloodMask,
        geo_transform: &GeoTransform,
        crs_wkt: Option<&str>,
    ) -> FloodResult<()> {
        let path = path.as_ref();
        let (rows, cols) = mask.dim();
        if mask.is_empty() {
            return Err(FloodError::InvalidMask(format!(
                "cannot write an empty mask (shape {:?})",
                mask.dim()
            )));
        }

        log::info!("Writing {}x{} flood mask to: {}", cols, rows, path.display());

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset =
            driver.create_with_band_type::<u8, _>(path, cols as isize, rows as isize, 1)?;

        dataset.set_geo_transform(&geo_transform.to_gdal())?;
        if let Some(wkt) = crs_wkt.filter(|wkt| !wkt.is_empty()) {
            dataset.set_projection(wkt)?;
        }

        let mut band = dataset.rasterband(1)?;
        let data: Vec<u8> = mask.iter().copied().collect();
        let buffer = Buffer::new((cols, rows), data);
        band.write((0, 0), (cols, rows), &buffer)?;

        log::debug!("Flood mask written ({} flood pixels)", mask.iter().filter(|&&v| v == 1).count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_shape_must_match_profile() {
        let profile = RasterProfile {
            width: 3,
            height: 2,
            band_count: 1,
            geo_transform: GeoTransform::default(),
            crs: None,
            band_types: vec!["Float32".to_string()],
            no_data: vec![None],
            driver: "GTiff".to_string(),
        };
        let mask = Array2::<u8>::zeros((3, 3));
        let dir = tempfile::tempdir().unwrap();

        let result = MaskWriter::write_geotiff(dir.path().join("mask.tif"), &mask, &profile);
        assert!(matches!(
            result,
            Err(FloodError::ShapeMismatch { expected: (2, 3), found: (3, 3) })
        ));
    }
}
