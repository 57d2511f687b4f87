pub mod compare;
pub mod consts;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod io;
pub mod operation;
pub mod raster;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod surface;
pub mod viewport;
