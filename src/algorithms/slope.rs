/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use super::flow_direction::{decode_flow, FlowCode};
use super::NumericGuard;
use crate::error::Result;
use crate::raster::Grid;
use crate::utils::{Outcome, TiledRunner};

/// Drop per unit distance from each cell to the neighbour its flow direction
/// points at. Distances are the x or y resolution for cardinal directions and
/// the diagonal resolution otherwise. Outlets, no-flow cells, no-data cells
/// and directions leading off the grid or onto no-data elevation give no-data.
///
/// A direction pointing at a higher neighbour leaves the cell without a
/// downhill neighbour, so it is no-data too. A zero drop is kept. Results are
/// never negative, and a non-negative elevation sentinel is replaced by
/// `DEFAULT_NODATA` in the output.
pub fn slope(
    elevation: &Grid,
    flow: &Grid,
    guard: NumericGuard,
    runner: &mut TiledRunner,
) -> Result<Outcome<Grid>> {
    elevation.check_same_dimensions(flow)?;
    let mut output = Grid::initialize_for_output(elevation, |nd| nd >= 0f64);
    let region = *elevation.region();
    let nodata = output.nodata();
    let columns = elevation.columns();
    let outcome = runner.run_rows("Slope", &mut output, |row| {
        let mut data = vec![nodata; columns];
        for col in 0..columns {
            let z = elevation.get_value(row as isize, col as isize);
            if elevation.is_nodata(z) {
                continue;
            }
            let dir = match decode_flow(flow, row, col)? {
                FlowCode::Towards(dir) => dir,
                _ => continue,
            };
            let (dr, dc) = dir.offset();
            let z_n = elevation.get_value(row as isize + dr, col as isize + dc);
            if elevation.is_nodata(z_n) || z_n > z {
                continue;
            }
            let value = (z - z_n) / dir.distance(&region);
            data[col] = if value.is_finite() {
                value
            } else {
                guard.resolve("slope", row, col, nodata)?
            };
        }
        Ok(data)
    })?;
    Ok(outcome.map(|_| output))
}
