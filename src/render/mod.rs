pub(crate) mod config;
pub(crate) mod image;
pub(crate) mod raster;
pub(crate) mod renderer;
pub(crate) mod sample;
