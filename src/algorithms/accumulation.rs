/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use super::flow_direction::{decode_flow, FlowCode, FlowDirection};
use crate::error::{HydroError, Result};
use crate::raster::Grid;
use crate::structures::Array2D;
use crate::utils::{Outcome, TiledRunner};

const TERMINAL: i8 = -1;
const EXCLUDED: i8 = -2;

/// Accumulates `source` down the flow graph: every cell ends up holding the
/// sum of the source values of all cells draining through it, itself
/// included. No-data source cells contribute zero; no-data flow cells are
/// left out of the graph and are no-data in the output.
///
/// Cells are finalised in topological order using per-cell inflow counts, so
/// each cell is visited exactly once. If some cells can never be finalised the
/// flow grid contains a cycle and `FlowGraphCycle` names one cell on it.
///
/// A cancelled run returns partial sums: finalised cells hold their final
/// value, the others hold whatever had reached them.
///
/// The output takes the flow grid's sentinel unless a sum could equal it.
/// Zero is always possible; when every source value has the same sign, so is
/// any value of that sign.
pub fn sum_downstream(flow: &Grid, source: &Grid, runner: &mut TiledRunner) -> Result<Outcome<Grid>> {
    flow.check_same_dimensions(source)?;
    let range = source.min_max();
    let reserved = move |nd: f64| match range {
        Some((min, _)) if min >= 0f64 => nd >= 0f64,
        Some((_, max)) if max <= 0f64 => nd <= 0f64,
        _ => nd == 0f64,
    };
    accumulate("Sum downstream", flow, runner, reserved, |row, col| {
        let v = source.get_value(row as isize, col as isize);
        if source.is_nodata(v) {
            0f64
        } else {
            v
        }
    })
}

/// Number of cells draining through each cell, itself included. A sentinel
/// of 1 or more is swapped for `DEFAULT_NODATA`.
pub fn total_contributing_area(flow: &Grid, runner: &mut TiledRunner) -> Result<Outcome<Grid>> {
    accumulate("Contributing area", flow, runner, |nd| nd >= 1f64, |_, _| 1f64)
}

fn accumulate<R, F>(
    task: &str,
    flow: &Grid,
    runner: &mut TiledRunner,
    reserved: R,
    source_value: F,
) -> Result<Outcome<Grid>>
where
    R: Fn(f64) -> bool,
    F: Fn(usize, usize) -> f64,
{
    let rows = flow.rows() as isize;
    let columns = flow.columns() as isize;

    // receiving direction of each cell, as an index into FlowDirection::ALL
    let mut flow_dir: Array2D<i8> = Array2D::new(rows, columns, EXCLUDED, EXCLUDED)?;
    let mut num_inflowing: Array2D<i8> = Array2D::new(rows, columns, -1, -1)?;
    let mut output = Grid::initialize_for_output(flow, reserved);
    let mut num_valid = 0usize;
    for row in 0..rows {
        for col in 0..columns {
            let code = decode_flow(flow, row as usize, col as usize)?;
            if code == FlowCode::NoData {
                continue;
            }
            num_valid += 1;
            num_inflowing[(row, col)] = 0;
            output.set_value(row as usize, col as usize, source_value(row as usize, col as usize));
            flow_dir[(row, col)] = match code {
                FlowCode::Towards(dir) => {
                    let (dr, dc) = dir.offset();
                    let (row_n, col_n) = (row + dr, col + dc);
                    if flow.is_nodata(flow[(row_n, col_n)]) {
                        TERMINAL
                    } else {
                        dir.code() as i8 - 1
                    }
                }
                _ => TERMINAL,
            };
        }
    }

    let mut stack = Vec::with_capacity(num_valid);
    for row in 0..rows {
        for col in 0..columns {
            let dir = flow_dir[(row, col)];
            if dir >= 0 {
                let (dr, dc) = FlowDirection::ALL[dir as usize].offset();
                num_inflowing.increment(row + dr, col + dc, 1);
            }
        }
    }
    for row in 0..rows {
        for col in 0..columns {
            if num_inflowing[(row, col)] == 0 {
                stack.push((row, col));
            }
        }
    }

    let granule = runner.scheme().cells_per_tile(columns as usize);
    runner.monitor().begin_task(task, num_valid as i64);
    let mut num_solved = 0usize;
    while let Some((row, col)) = stack.pop() {
        let fa = output[(row, col)];
        num_inflowing.decrement(row, col, 1);
        let dir = flow_dir[(row, col)];
        if dir >= 0 {
            let (dr, dc) = FlowDirection::ALL[dir as usize].offset();
            let (row_n, col_n) = (row + dr, col + dc);
            output.increment(row_n as usize, col_n as usize, fa);
            num_inflowing.decrement(row_n, col_n, 1);
            if num_inflowing[(row_n, col_n)] == 0 {
                stack.push((row_n, col_n));
            }
        }
        num_solved += 1;
        if num_solved % granule == 0 {
            runner.monitor().worked(granule);
            if runner.is_cancelled() {
                tracing::warn!(task, num_solved, "pass cancelled");
                runner.monitor().done();
                return Ok(Outcome::Cancelled(output));
            }
        }
    }
    runner.monitor().worked(num_solved % granule);
    runner.monitor().done();

    if num_solved < num_valid {
        // whatever is left unsolved sits on a closed loop
        for row in 0..rows {
            for col in 0..columns {
                if num_inflowing[(row, col)] > 0 {
                    tracing::error!(task, row, col, "flow directions form a cycle");
                    return Err(HydroError::FlowGraphCycle {
                        row: row as usize,
                        col: col as usize,
                    });
                }
            }
        }
    }
    Ok(Outcome::Completed(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{d8_flow_directions, OUTLET_CODE};
    use crate::raster::DEFAULT_NODATA;
    use crate::utils::{CancelFlag, NullProgress, TileScheme};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const ND: f64 = -9999.0;

    fn grid(rows: &[Vec<f64>]) -> Grid {
        Grid::from_rows(rows, ND).unwrap()
    }

    #[test]
    fn test_chain_sums() {
        // A -> B -> C -> D, D is the outlet
        let flow = grid(&[vec![1.0, 1.0, 1.0, 10.0]]);
        let source = grid(&[vec![1.0, 1.0, 1.0, 1.0]]);
        let acc = sum_downstream(&flow, &source, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(acc.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_tributaries_join() {
        // two cells drain south-east and south-west into the middle of the bottom row
        let flow = grid(&[
            vec![8.0, ND, 6.0],
            vec![1.0, 7.0, 5.0],
            vec![ND, 10.0, ND],
        ]);
        let tca = total_contributing_area(&flow, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(tca.get(2, 1).unwrap(), 6.0);
        assert_eq!(tca.get(1, 1).unwrap(), 5.0);
        assert_eq!(tca.get(1, 0).unwrap(), 1.0);
        assert!(tca.is_nodata(tca.get(0, 1).unwrap()));
        assert!(tca.is_nodata(tca.get(2, 0).unwrap()));
    }

    #[test]
    fn test_nodata_source_contributes_zero() {
        let flow = grid(&[vec![1.0, 1.0, 10.0]]);
        let source = grid(&[vec![2.0, ND, 3.0]]);
        let acc = sum_downstream(&flow, &source, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(acc.values(), &[2.0, 2.0, 5.0]);
    }

    #[test]
    fn test_sums_never_read_as_nodata() {
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 1.0, 10.0, 20.0]], 20.0).unwrap();
        let source = grid(&[vec![5.0, 5.0, 5.0, 5.0, 5.0]]);
        let acc = sum_downstream(&flow, &source, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(acc.nodata(), DEFAULT_NODATA);
        assert_eq!(acc.get(0, 3).unwrap(), 20.0);
        assert!(!acc.is_nodata(acc.get(0, 3).unwrap()));
        assert!(acc.is_nodata(acc.get(0, 4).unwrap()));

        let tca = total_contributing_area(&flow, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(tca.nodata(), DEFAULT_NODATA);
        assert_eq!(tca.get(0, 3).unwrap(), 4.0);

        // with mixed signs only zero is ruled out, so a sentinel of 20 is kept
        let source = grid(&[vec![-1.0, 2.0, 3.0, 4.0, 5.0]]);
        let acc = sum_downstream(&flow, &source, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(acc.nodata(), 20.0);
        assert_eq!(acc.get(0, 3).unwrap(), 8.0);
    }

    #[test]
    fn test_flow_into_nodata_is_terminal() {
        let flow = grid(&[vec![1.0, 1.0, ND, 5.0]]);
        let acc = total_contributing_area(&flow, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(acc.get(0, 1).unwrap(), 2.0);
        assert_eq!(acc.get(0, 3).unwrap(), 1.0);
    }

    #[test]
    fn test_two_cell_cycle_is_reported() {
        let flow = grid(&[vec![1.0, 5.0, 10.0]]);
        match total_contributing_area(&flow, &mut TiledRunner::silent()) {
            Err(HydroError::FlowGraphCycle { row, col }) => {
                assert_eq!(row, 0);
                assert!(col <= 1);
            }
            other => panic!("expected a cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_with_upstream_tree() {
        // (0,0) feeds a loop around the 2x2 block on the right
        let flow = grid(&[vec![1.0, 1.0, 7.0], vec![10.0, 3.0, 5.0]]);
        match total_contributing_area(&flow, &mut TiledRunner::silent()) {
            Err(HydroError::FlowGraphCycle { row, col }) => {
                assert!((row, col) != (0, 0) && (row, col) != (1, 0));
            }
            other => panic!("expected a cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_code_is_rejected() {
        let flow = grid(&[vec![1.0, 12.0]]);
        assert!(matches!(
            total_contributing_area(&flow, &mut TiledRunner::silent()),
            Err(HydroError::InvalidData(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let flow = grid(&[vec![1.0, 10.0]]);
        let source = grid(&[vec![1.0], vec![1.0]]);
        assert!(matches!(
            sum_downstream(&flow, &source, &mut TiledRunner::silent()),
            Err(HydroError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_conservation_on_random_dems() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..10 {
            let (rows, columns) = (rng.gen_range(3..20), rng.gen_range(3..20));
            let dem: Vec<Vec<f64>> = (0..rows)
                .map(|_| {
                    (0..columns)
                        .map(|_| {
                            if rng.gen_bool(0.05) {
                                ND
                            } else {
                                rng.gen_range(0.0..100.0)
                            }
                        })
                        .collect()
                })
                .collect();
            let dem = grid(&dem);
            let flow = d8_flow_directions(&dem, &mut TiledRunner::silent())
                .unwrap()
                .into_inner()
                .directions;
            let source: Vec<Vec<f64>> = (0..rows)
                .map(|_| (0..columns).map(|_| rng.gen_range(0.0..5.0)).collect())
                .collect();
            let source = grid(&source);
            let acc = sum_downstream(&flow, &source, &mut TiledRunner::silent())
                .unwrap()
                .into_inner();

            let mut outlet_total = 0.0;
            let mut source_total = 0.0;
            for row in 0..rows {
                for col in 0..columns {
                    if flow.is_nodata(flow.get(row as isize, col as isize).unwrap()) {
                        continue;
                    }
                    source_total += source.get(row as isize, col as isize).unwrap();
                    if crate::algorithms::downstream_cell(&flow, row, col)
                        .unwrap()
                        .is_none()
                    {
                        outlet_total += acc.get(row as isize, col as isize).unwrap();
                    }
                }
            }
            assert!((outlet_total - source_total).abs() < 1e-6 * source_total.max(1.0));
        }
    }

    #[test]
    fn test_outlets_collect_whole_grid() {
        let dem = grid(&[
            vec![5.0, 4.0, 3.0],
            vec![4.0, 3.0, 2.0],
            vec![3.0, 2.0, 1.0],
        ]);
        let flow = d8_flow_directions(&dem, &mut TiledRunner::silent())
            .unwrap()
            .into_inner()
            .directions;
        assert_eq!(flow.get(2, 2).unwrap(), OUTLET_CODE);
        let tca = total_contributing_area(&flow, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(tca.get(2, 2).unwrap(), 9.0);
    }

    #[test]
    fn test_cancelled_run_returns_partial_sums() {
        let mut cells = vec![1.0; 9];
        cells.push(10.0);
        let flow = grid(&[cells]);
        let flag = CancelFlag::new();
        flag.cancel();
        let mut runner = TiledRunner::new(
            TileScheme::new(1, 1),
            Box::new(NullProgress::with_cancel_flag(flag)),
        );
        // the first granule (one row of ten cells) completes before the flag is seen
        let outcome = total_contributing_area(&flow, &mut runner).unwrap();
        assert!(outcome.is_cancelled());
    }
}
