/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use super::NumericGuard;
use crate::error::Result;
use crate::raster::Grid;
use crate::utils::{Outcome, TiledRunner};

#[derive(Debug, Clone, Copy, Default)]
pub struct TopIndexParams {
    pub guard: NumericGuard,
}

/// Topographic wetness index `ln(accumulation / slope)`.
///
/// No-data in either input gives no-data. A zero slope, a non-positive ratio
/// or a non-finite result is handed to the numeric guard, so the output never
/// holds an infinity or NaN.
pub fn top_index(
    accumulation: &Grid,
    slope: &Grid,
    params: &TopIndexParams,
    runner: &mut TiledRunner,
) -> Result<Outcome<Grid>> {
    accumulation.check_same_dimensions(slope)?;
    let mut output = Grid::initialize_using_grid(accumulation);
    let nodata = accumulation.nodata();
    let columns = accumulation.columns();
    let guard = params.guard;
    let outcome = runner.run_rows("Topographic index", &mut output, |row| {
        let mut data = vec![nodata; columns];
        let acc_row = accumulation.get_row_data(row);
        let slope_row = slope.get_row_data(row);
        for col in 0..columns {
            let (acc, s) = (acc_row[col], slope_row[col]);
            if accumulation.is_nodata(acc) || slope.is_nodata(s) {
                continue;
            }
            if s == 0f64 {
                data[col] = guard.resolve("top_index", row, col, nodata)?;
                continue;
            }
            let ratio = acc / s;
            data[col] = if ratio > 0f64 && ratio.is_finite() {
                ratio.ln()
            } else {
                guard.resolve("top_index", row, col, nodata)?
            };
        }
        Ok(data)
    })?;
    Ok(outcome.map(|_| output))
}
