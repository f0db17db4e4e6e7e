//! Python bindings for the flood mapping core

use ndarray::{Array2, Ix2};
use numpy::{IntoPyArray, PyReadonlyArray2, PyReadonlyArrayDyn};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::{FloodClassifier, FloodDetectionParams, FloodDetector};
use crate::io::{MaskWriter, RasterReader};
use crate::types::{FloodError, GeoTransform, Modality, RasterProfile};

/// Input/config errors become ValueError, raster I/O errors RuntimeError
fn to_py_err(err: FloodError) -> PyErr {
    match &err {
        FloodError::RasterOpen { .. } | FloodError::Gdal(_) | FloodError::Io(_) => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn build_params(
    sar_threshold: f64,
    optical_threshold: f64,
    sensor: &str,
    index: &str,
) -> PyResult<FloodDetectionParams> {
    Ok(FloodDetectionParams {
        sar_threshold_db: sar_threshold,
        optical_threshold,
        sensor: sensor.parse().map_err(to_py_err)?,
        water_index: index.parse().map_err(to_py_err)?,
        ..FloodDetectionParams::default()
    })
}

fn profile_to_dict<'py>(py: Python<'py>, profile: &RasterProfile) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    dict.set_item("width", profile.width)?;
    dict.set_item("height", profile.height)?;
    dict.set_item("count", profile.band_count)?;
    dict.set_item("transform", profile.geo_transform.to_gdal().to_vec())?;
    dict.set_item("crs", profile.crs.as_ref().map(|crs| crs.wkt.clone()))?;
    dict.set_item("epsg", profile.crs.as_ref().and_then(|crs| crs.epsg))?;
    dict.set_item("dtypes", profile.band_types.clone())?;
    dict.set_item("nodata", profile.no_data.clone())?;
    dict.set_item("driver", profile.driver.clone())?;
    dict.set_item("ground_pixel_size", profile.ground_pixel_size())?;
    Ok(dict)
}

/// Open a raster: returns (list of float64 bands, profile dict)
#[pyfunction]
fn open_raster(py: Python, path: String) -> PyResult<(Vec<PyObject>, PyObject)> {
    let (bands, profile) = RasterReader::open_raster(&path).map_err(to_py_err)?;

    let py_bands: Vec<PyObject> = bands
        .into_iter()
        .map(|band| band.into_pyarray(py).into())
        .collect();

    Ok((py_bands, profile_to_dict(py, &profile)?.into()))
}

/// Classify bands into a uint8 flood mask
#[pyfunction]
#[pyo3(signature = (bands, modality, sar_threshold=-15.0, optical_threshold=0.3, sensor="generic4band", index="ndwi"))]
fn classify_flood(
    py: Python,
    bands: Vec<PyReadonlyArray2<f64>>,
    modality: &str,
    sar_threshold: f64,
    optical_threshold: f64,
    sensor: &str,
    index: &str,
) -> PyResult<PyObject> {
    let modality: Modality = modality.parse().map_err(to_py_err)?;
    let params = build_params(sar_threshold, optical_threshold, sensor, index)?;
    let classifier = FloodClassifier::new(params).map_err(to_py_err)?;

    let bands: Vec<Array2<f64>> = bands.iter().map(|b| b.as_array().to_owned()).collect();
    let mask = classifier.classify(&bands, modality).map_err(to_py_err)?;

    Ok(mask.into_pyarray(py).into())
}

/// Flooded area in km² of a binary mask with square pixels
#[pyfunction]
#[pyo3(signature = (mask, pixel_size=10.0))]
fn estimate_flood_area(mask: PyReadonlyArrayDyn<u8>, pixel_size: f64) -> PyResult<f64> {
    let view = mask.as_array();
    let ndim = view.ndim();
    let mask = view.into_dimensionality::<Ix2>().map_err(|_| {
        to_py_err(FloodError::InvalidMask(format!(
            "mask must be 2-dimensional, got {} dimensions",
            ndim
        )))
    })?;

    crate::core::estimate_area(&mask.to_owned(), pixel_size).map_err(to_py_err)
}

/// Full pipeline on a raster file
#[pyfunction]
#[pyo3(signature = (path, modality, sar_threshold=-15.0, optical_threshold=0.3, sensor="generic4band", index="ndwi"))]
fn detect_flood(
    py: Python,
    path: String,
    modality: &str,
    sar_threshold: f64,
    optical_threshold: f64,
    sensor: &str,
    index: &str,
) -> PyResult<PyObject> {
    let modality: Modality = modality.parse().map_err(to_py_err)?;
    let params = build_params(sar_threshold, optical_threshold, sensor, index)?;
    let detector = FloodDetector::new(params.clone()).map_err(to_py_err)?;
    let detection = detector.detect(&path, modality).map_err(to_py_err)?;
    let report_json = detection.report(&params).to_json().map_err(to_py_err)?;

    let result = PyDict::new(py);
    result.set_item("profile", profile_to_dict(py, &detection.profile)?)?;
    result.set_item("area_km2", detection.area.area_km2)?;
    result.set_item("flood_pixels", detection.statistics.flood_pixels)?;
    result.set_item("pixel_size_from_profile", detection.area.from_profile)?;
    result.set_item("report_json", report_json)?;
    result.set_item("mask", detection.mask.into_pyarray(py))?;

    Ok(result.into())
}

/// Write a mask as a georeferenced GeoTIFF
#[pyfunction]
#[pyo3(signature = (path, mask, geo_transform, crs_wkt=None))]
fn export_flood_mask(
    path: String,
    mask: PyReadonlyArray2<u8>,
    geo_transform: Vec<f64>,
    crs_wkt: Option<String>,
) -> PyResult<()> {
    let gt: [f64; 6] = geo_transform
        .as_slice()
        .try_into()
        .map_err(|_| PyValueError::new_err("geo_transform must have exactly 6 elements"))?;

    let mask = mask.as_array().to_owned();
    MaskWriter::write_with_georef(&path, &mask, &GeoTransform::from_gdal(gt), crs_wkt.as_deref())
        .map_err(to_py_err)
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(open_raster, m)?)?;
    m.add_function(wrap_pyfunction!(classify_flood, m)?)?;
    m.add_function(wrap_pyfunction!(estimate_flood_area, m)?)?;
    m.add_function(wrap_pyfunction!(detect_flood, m)?)?;
    m.add_function(wrap_pyfunction!(export_flood_mask, m)?)?;
    Ok(())
}
