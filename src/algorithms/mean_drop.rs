/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use super::accumulation::sum_downstream;
use super::NumericGuard;
use crate::error::Result;
use crate::raster::Grid;
use crate::utils::{Outcome, TiledRunner};

/// Mean elevation of each cell's contributing area minus the cell's own
/// elevation: `accum / tca - z`, where `accum` is the downstream sum of
/// `elevation`.
///
/// When `tca` is `None` the divisor counts only contributing cells with valid
/// elevation, so the result is an exact mean. A supplied `tca` is used as is.
/// No-data in any input gives no-data; `tca <= 0` goes to the numeric guard.
/// A cancelled run returns an all no-data grid.
pub fn mean_drop(
    flow: &Grid,
    elevation: &Grid,
    tca: Option<&Grid>,
    guard: NumericGuard,
    runner: &mut TiledRunner,
) -> Result<Outcome<Grid>> {
    flow.check_same_dimensions(elevation)?;
    if let Some(tca) = tca {
        flow.check_same_dimensions(tca)?;
    }
    let accum = match sum_downstream(flow, elevation, runner)? {
        Outcome::Completed(g) => g,
        Outcome::Cancelled(_) => return Ok(Outcome::Cancelled(Grid::initialize_using_grid(elevation))),
    };
    let counted;
    let tca = match tca {
        Some(tca) => tca,
        None => {
            // 0/1 mask, so its sentinel must be neither
            let mut valid = Grid::initialize_for_output(elevation, |nd| nd == 0f64 || nd == 1f64);
            for row in 0..elevation.rows() {
                let data = elevation
                    .get_row_data(row)
                    .iter()
                    .map(|z| if elevation.is_nodata(*z) { 0f64 } else { 1f64 })
                    .collect();
                valid.set_row_data(row, data)?;
            }
            counted = match sum_downstream(flow, &valid, runner)? {
                Outcome::Completed(g) => g,
                Outcome::Cancelled(_) => {
                    return Ok(Outcome::Cancelled(Grid::initialize_using_grid(elevation)))
                }
            };
            &counted
        }
    };

    // headwater cells always give zero
    let mut output = Grid::initialize_for_output(elevation, |nd| nd == 0f64);
    let nodata = output.nodata();
    let columns = elevation.columns();
    let outcome = runner.run_rows("Mean drop", &mut output, |row| {
        let mut data = vec![nodata; columns];
        for col in 0..columns {
            let (r, c) = (row as isize, col as isize);
            let z = elevation.get_value(r, c);
            let a = accum.get_value(r, c);
            let t = tca.get_value(r, c);
            if elevation.is_nodata(z) || accum.is_nodata(a) || tca.is_nodata(t) {
                continue;
            }
            data[col] = if t > 0f64 {
                a / t - z
            } else {
                guard.resolve("mean_drop", row, col, nodata)?
            };
        }
        Ok(data)
    })?;
    Ok(outcome.map(|_| output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HydroError;

    const ND: f64 = -9999.0;

    #[test]
    fn test_mean_drop_on_chain() {
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 10.0]], ND).unwrap();
        let dem = Grid::from_rows(&[vec![9.0, 6.0, 3.0]], ND).unwrap();
        let out = mean_drop(&flow, &dem, None, NumericGuard::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.values(), &[0.0, 1.5, 3.0]);
    }

    #[test]
    fn test_nodata_elevation_is_not_counted() {
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 10.0]], ND).unwrap();
        let dem = Grid::from_rows(&[vec![ND, 6.0, 4.0]], ND).unwrap();
        let out = mean_drop(&flow, &dem, None, NumericGuard::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(0, 0).unwrap(), ND);
        assert_eq!(out.get(0, 1).unwrap(), 0.0);
        assert_eq!(out.get(0, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_small_integer_sentinels() {
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 10.0]], ND).unwrap();
        for nd in [0.0, 1.0] {
            let dem = Grid::from_rows(&[vec![9.0, 6.0, 3.0]], nd).unwrap();
            let out = mean_drop(&flow, &dem, None, NumericGuard::Fail, &mut TiledRunner::silent())
                .unwrap()
                .into_inner();
            assert_eq!(out.values(), &[0.0, 1.5, 3.0]);
            assert!(!out.is_nodata(out.get(0, 0).unwrap()));
        }
    }

    #[test]
    fn test_supplied_tca_and_guard() {
        let flow = Grid::from_rows(&[vec![1.0, 10.0]], ND).unwrap();
        let dem = Grid::from_rows(&[vec![4.0, 2.0]], ND).unwrap();
        let tca = Grid::from_rows(&[vec![1.0, 0.0]], ND).unwrap();
        let out = mean_drop(&flow, &dem, Some(&tca), NumericGuard::Substitute, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.values(), &[0.0, ND]);
        assert!(matches!(
            mean_drop(&flow, &dem, Some(&tca), NumericGuard::Fail, &mut TiledRunner::silent()),
            Err(HydroError::NumericGuard { op: "mean_drop", .. })
        ));
    }
}
