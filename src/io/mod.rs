//! I/O modules for reading input rasters and writing flood masks

pub mod raster_reader;
pub mod mask_writer;

pub use raster_reader::{open_raster, RasterReader};
pub use mask_writer::MaskWriter;
