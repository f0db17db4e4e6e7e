use ndarray::{Array2, Zip};
use num_traits::Float;

use crate::types::{FloodError, FloodResult};

/// Denominator offset guarding against 0/0 when both bands are zero
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Normalized difference `(a - b) / (a + b + epsilon)` per pixel.
///
/// With non-negative reflectance the result lies in [-1, 1]. NaN inputs
/// propagate to NaN outputs.
pub fn normalized_difference<T>(a: &Array2<T>, b: &Array2<T>, epsilon: T) -> FloodResult<Array2<T>>
where
    T: Float + Send + Sync,
{
    if a.dim() != b.dim() {
        return Err(FloodError::ShapeMismatch {
            expected: a.dim(),
            found: b.dim(),
        });
    }

    let nd = |&x: &T, &y: &T| (x - y) / (x + y + epsilon);
    let index = if cfg!(feature = "parallel") {
        Zip::from(a).and(b).par_map_collect(nd)
    } else {
        Zip::from(a).and(b).map_collect(nd)
    };

    Ok(index)
}

/// NDWI/MNDWI from a green band and a water-absorbing (NIR or SWIR) band
pub fn ndwi(green: &Array2<f64>, water: &Array2<f64>, epsilon: f64) -> FloodResult<Array2<f64>> {
    log::debug!("Computing normalized difference water index (epsilon = {:e})", epsilon);
    normalized_difference(green, water, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_ndwi_values() {
        let green = array![[0.5, 0.1]];
        let nir = array![[0.1, 0.5]];
        let index = ndwi(&green, &nir, DEFAULT_EPSILON).unwrap();

        assert_relative_eq!(index[[0, 0]], 0.4 / (0.6 + DEFAULT_EPSILON), epsilon = 1e-12);
        assert_relative_eq!(index[[0, 1]], -0.4 / (0.6 + DEFAULT_EPSILON), epsilon = 1e-12);
        assert_relative_eq!(index[[0, 0]], 0.6667, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_bands_do_not_divide_by_zero() {
        let zeros = Array2::<f64>::zeros((2, 2));
        let index = ndwi(&zeros, &zeros, DEFAULT_EPSILON).unwrap();
        assert!(index.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_index_bounded_for_non_negative_input() {
        let green = Array2::from_shape_fn((8, 8), |(i, j)| i as f64 * 0.1 + j as f64 * 0.05);
        let nir = Array2::from_shape_fn((8, 8), |(i, j)| (j as f64) * 0.2 + (i % 3) as f64);
        let index = ndwi(&green, &nir, DEFAULT_EPSILON).unwrap();
        assert!(index.iter().all(|&v| (-1.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((3, 2));
        let err = ndwi(&a, &b, DEFAULT_EPSILON).unwrap_err();
        assert!(matches!(err, FloodError::ShapeMismatch { expected: (2, 3), found: (3, 2) }));
    }

    #[test]
    fn test_generic_over_f32() {
        let a = array![[0.8f32, 0.2]];
        let b = array![[0.2f32, 0.2]];
        let index = normalized_difference(&a, &b, 1e-6f32).unwrap();
        assert_relative_eq!(index[[0, 0]], 0.6, epsilon = 1e-5);
        assert_relative_eq!(index[[0, 1]], 0.0, epsilon = 1e-5);
    }
}
