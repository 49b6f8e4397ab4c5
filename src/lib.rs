/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

//! Raster hydrology on regular grids: pit filling, D8 flow directions,
//! downstream accumulation and local terrain derivatives.
//!
//! Operators take their inputs by reference, return a fresh output grid and
//! run under a [`utils::TiledRunner`], which supplies row-band parallelism,
//! progress reporting and cancellation. The `tools` module wraps each
//! operator as a command-line tool.

pub mod algorithms;
pub mod configs;
pub mod error;
pub mod raster;
pub mod structures;
pub mod tools;
pub mod utils;

pub use crate::error::{HydroError, Result};
pub use crate::raster::{Grid, Region, DEFAULT_NODATA};
