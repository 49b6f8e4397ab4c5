/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/
// private sub-module defined in other files
mod accumulation;
mod flow_direction;
mod gradient;
mod hypsographic;
mod mean_drop;
mod nabla;
mod pit_fill;
mod slope;
mod top_index;

// exports identifiers from private sub-modules in the current module namespace
pub use self::accumulation::{sum_downstream, total_contributing_area};
pub use self::flow_direction::{
    d8_flow_directions, decode_flow, downstream_cell, initialize_flow_grid, D8Output, FlowCode,
    FlowDirection, NO_FLOW_CODE, OUTLET_CODE,
};
pub use self::gradient::{gradient, GradientMode, GradientParams};
pub use self::hypsographic::{hypsographic_curve, HypsographicCurve, HypsographicPoint};
pub use self::mean_drop::mean_drop;
pub use self::nabla::{nabla, NablaMode, NablaParams, CONCAVE_CLASS, CONVEX_CLASS, PLANAR_CLASS};
pub use self::pit_fill::{fill_pits, raise_above, PitFillMethod, PitFillParams, PitFillReport};
pub use self::slope::slope;
pub use self::top_index::{top_index, TopIndexParams};

use crate::error::{HydroError, Result};

/// What an operator does with a cell whose arithmetic is undefined (division
/// by zero, logarithm of a non-positive number, a non-finite result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericGuard {
    /// Write no-data to the cell and carry on.
    #[default]
    Substitute,
    /// Abort the run with `HydroError::NumericGuard`.
    Fail,
}

impl NumericGuard {
    pub(crate) fn resolve(self, op: &'static str, row: usize, col: usize, nodata: f64) -> Result<f64> {
        match self {
            NumericGuard::Substitute => Ok(nodata),
            NumericGuard::Fail => Err(HydroError::NumericGuard { op, row, col }),
        }
    }
}
