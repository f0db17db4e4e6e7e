use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::core::classifier::DEFAULT_PIXEL_SIZE_M;
use crate::types::{FloodError, FloodMask, FloodResult, RasterProfile};

const M2_PER_KM2: f64 = 1_000_000.0;

/// Pixel counts of a flood mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub flood_pixels: usize,
    pub total_pixels: usize,
    pub flood_percentage: f64,
}

/// Area estimate together with the pixel size it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaEstimate {
    pub area_km2: f64,
    pub pixel_width_m: f64,
    pub pixel_height_m: f64,
    /// False when the fallback pixel size replaced the raster's resolution
    pub from_profile: bool,
}

/// Count flood pixels, rejecting empty or non-binary masks
pub fn mask_statistics(mask: &FloodMask) -> FloodResult<MaskStatistics> {
    if mask.is_empty() {
        return Err(FloodError::InvalidMask(format!(
            "mask has no pixels (shape {:?})",
            mask.dim()
        )));
    }

    let flood_pixels = count_flood_pixels(mask)?;
    let total_pixels = mask.len();
    Ok(MaskStatistics {
        flood_pixels,
        total_pixels,
        flood_percentage: 100.0 * flood_pixels as f64 / total_pixels as f64,
    })
}

fn count_row(row: ArrayView1<u8>) -> FloodResult<usize> {
    row.iter().try_fold(0usize, |count, &value| match value {
        0 => Ok(count),
        1 => Ok(count + 1),
        other => Err(FloodError::InvalidMask(format!(
            "mask must be binary (0/1), found value {}",
            other
        ))),
    })
}

#[cfg(feature = "parallel")]
fn count_flood_pixels(mask: &FloodMask) -> FloodResult<usize> {
    use rayon::prelude::*;

    (0..mask.nrows())
        .into_par_iter()
        .map(|row| count_row(mask.row(row)))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

#[cfg(not(feature = "parallel"))]
fn count_flood_pixels(mask: &FloodMask) -> FloodResult<usize> {
    mask.outer_iter()
        .try_fold(0usize, |count, row| Ok(count + count_row(row)?))
}

/// Flooded area in km² for square pixels of `pixel_size_meters`,
/// rounded to 2 decimal places
pub fn estimate_area(mask: &FloodMask, pixel_size_meters: f64) -> FloodResult<f64> {
    estimate_area_rect(mask, pixel_size_meters, pixel_size_meters)
}

/// Flooded area in km² for rectangular pixels, rounded to 2 decimal places
pub fn estimate_area_rect(
    mask: &FloodMask,
    pixel_width_m: f64,
    pixel_height_m: f64,
) -> FloodResult<f64> {
    for (name, size) in [("pixel width", pixel_width_m), ("pixel height", pixel_height_m)] {
        if !(size.is_finite() && size > 0.0) {
            return Err(FloodError::InvalidParameter(format!(
                "{} must be a positive number of meters, got {}",
                name, size
            )));
        }
    }

    let stats = mask_statistics(mask)?;
    let area_km2 = stats.flood_pixels as f64 * pixel_width_m * pixel_height_m / M2_PER_KM2;

    log::debug!(
        "Flooded area: {} pixels x {}m x {}m = {:.6} km²",
        stats.flood_pixels, pixel_width_m, pixel_height_m, area_km2
    );

    Ok(round_to_hundredths(area_km2))
}

/// Flooded area using the profile's ground resolution when it is known
/// in meters, otherwise `fallback_pixel_size_m` square pixels
pub fn estimate_area_for_profile(
    mask: &FloodMask,
    profile: &RasterProfile,
    fallback_pixel_size_m: f64,
) -> FloodResult<AreaEstimate> {
    if mask.dim() != profile.shape() {
        return Err(FloodError::ShapeMismatch {
            expected: profile.shape(),
            found: mask.dim(),
        });
    }

    let (pixel_width_m, pixel_height_m, from_profile) = match profile.ground_pixel_size() {
        Some((w, h)) => (w, h, true),
        None => {
            log::warn!(
                "Raster resolution is not available in meters, assuming {}m pixels",
                fallback_pixel_size_m
            );
            (fallback_pixel_size_m, fallback_pixel_size_m, false)
        }
    };

    Ok(AreaEstimate {
        area_km2: estimate_area_rect(mask, pixel_width_m, pixel_height_m)?,
        pixel_width_m,
        pixel_height_m,
        from_profile,
    })
}

/// Default-parameter convenience matching the 10 m assumption
pub fn estimate_area_default(mask: &FloodMask) -> FloodResult<f64> {
    estimate_area(mask, DEFAULT_PIXEL_SIZE_M)
}

/// Two decimal places, ties to even
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CrsInfo, GeoTransform};
    use ndarray::{array, Array2};

    #[test]
    fn test_example_scene_rounds_to_zero() {
        let mask = array![[1u8, 0], [1, 0]];
        assert_eq!(estimate_area(&mask, 10.0).unwrap(), 0.0);
        assert_eq!(estimate_area_default(&mask).unwrap(), 0.0);
    }

    #[test]
    fn test_area_formula() {
        // 1000 x 1000 flood pixels at 10 m = 100 km²
        let mask = Array2::<u8>::ones((1000, 1000));
        assert_eq!(estimate_area(&mask, 10.0).unwrap(), 100.0);

        // 1234 pixels at 30 m = 1.1106 km²
        let mut mask = Array2::<u8>::zeros((100, 100));
        mask.iter_mut().take(1234).for_each(|v| *v = 1);
        assert_eq!(estimate_area(&mask, 30.0).unwrap(), 1.11);
    }

    #[test]
    fn test_half_hundredths_round_to_even() {
        // 1250 pixels at 10 m = 0.125 km², 3750 pixels = 0.375 km²
        let mut mask = Array2::<u8>::zeros((100, 100));
        mask.iter_mut().take(1250).for_each(|v| *v = 1);
        assert_eq!(estimate_area(&mask, 10.0).unwrap(), 0.12);

        mask.iter_mut().take(3750).for_each(|v| *v = 1);
        assert_eq!(estimate_area(&mask, 10.0).unwrap(), 0.38);
    }

    #[test]
    fn test_zero_iff_no_flood() {
        let mask = Array2::<u8>::zeros((50, 50));
        assert_eq!(estimate_area(&mask, 10.0).unwrap(), 0.0);
    }

    #[test]
    fn test_monotonic_in_flood_pixels() {
        let mut mask = Array2::<u8>::zeros((200, 200));
        let mut previous = 0.0;
        for step in 0..20 {
            mask.iter_mut().skip(step * 1000).take(1000).for_each(|v| *v = 1);
            let area = estimate_area(&mask, 10.0).unwrap();
            assert!(area >= previous);
            previous = area;
        }
        assert_eq!(previous, 2.0);
    }

    #[test]
    fn test_empty_mask_rejected() {
        let mask = Array2::<u8>::zeros((0, 5));
        assert!(matches!(estimate_area(&mask, 10.0), Err(FloodError::InvalidMask(_))));
    }

    #[test]
    fn test_non_binary_mask_rejected() {
        let mask = array![[0u8, 2]];
        assert!(matches!(estimate_area(&mask, 10.0), Err(FloodError::InvalidMask(_))));
    }

    #[test]
    fn test_invalid_pixel_size_rejected() {
        let mask = array![[1u8]];
        assert!(matches!(estimate_area(&mask, 0.0), Err(FloodError::InvalidParameter(_))));
        assert!(matches!(estimate_area(&mask, f64::NAN), Err(FloodError::InvalidParameter(_))));
    }

    #[test]
    fn test_non_binary_value_in_last_row_rejected() {
        let mut mask = Array2::<u8>::ones((64, 64));
        mask[[63, 10]] = 255;
        assert!(matches!(mask_statistics(&mask), Err(FloodError::InvalidMask(_))));
    }

    #[test]
    fn test_statistics_large_mask() {
        let mask = Array2::from_shape_fn((300, 200), |(r, c)| u8::from((r + c) % 4 == 0));
        let expected = mask.iter().filter(|&&v| v == 1).count();
        assert_eq!(mask_statistics(&mask).unwrap().flood_pixels, expected);
    }

    #[test]
    fn test_statistics() {
        let stats = mask_statistics(&array![[1u8, 0, 0, 1]]).unwrap();
        assert_eq!(stats.flood_pixels, 2);
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.flood_percentage, 50.0);
    }

    fn profile(crs: Option<CrsInfo>) -> RasterProfile {
        RasterProfile {
            width: 100,
            height: 100,
            band_count: 1,
            geo_transform: GeoTransform::from_gdal([0.0, 20.0, 0.0, 0.0, 0.0, -20.0]),
            crs,
            band_types: vec!["Float32".to_string()],
            no_data: vec![None],
            driver: "GTiff".to_string(),
        }
    }

    #[test]
    fn test_profile_resolution_is_used() {
        let crs = CrsInfo {
            wkt: String::new(),
            epsg: Some(32633),
            is_projected: true,
            linear_unit_meters: 1.0,
        };
        let mask = Array2::<u8>::ones((100, 100));
        let estimate = estimate_area_for_profile(&mask, &profile(Some(crs)), 10.0).unwrap();

        assert!(estimate.from_profile);
        assert_eq!(estimate.pixel_width_m, 20.0);
        assert_eq!(estimate.area_km2, 4.0);
    }

    #[test]
    fn test_profile_without_crs_falls_back() {
        let mask = Array2::<u8>::ones((100, 100));
        let estimate = estimate_area_for_profile(&mask, &profile(None), 10.0).unwrap();

        assert!(!estimate.from_profile);
        assert_eq!(estimate.pixel_width_m, 10.0);
        assert_eq!(estimate.area_km2, 1.0);
    }

    #[test]
    fn test_profile_shape_mismatch() {
        let mask = Array2::<u8>::ones((10, 100));
        let result = estimate_area_for_profile(&mask, &profile(None), 10.0);
        assert!(matches!(result, Err(FloodError::ShapeMismatch { .. })));
    }
}
