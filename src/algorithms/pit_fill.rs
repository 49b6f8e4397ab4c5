/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::error::{HydroError, Result};
use crate::raster::{Grid, NEIGHBOUR_OFFSETS};
use crate::structures::{Array2D, GridCell};
use crate::utils::{Outcome, TiledRunner};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitFillMethod {
    /// Priority-flood from the boundary inwards (Barnes et al., 2014); one
    /// pass, O(n log n).
    #[default]
    PriorityFlood,
    /// Iterative water-surface lowering (Planchon and Darboux, 2001), bounded
    /// by `max_iterations` passes.
    PlanchonDarboux,
}

impl PitFillMethod {
    pub fn from_name(name: &str) -> Option<PitFillMethod> {
        match name.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "priorityflood" | "flood" => Some(PitFillMethod::PriorityFlood),
            "planchondarboux" | "planchon" | "pd" => Some(PitFillMethod::PlanchonDarboux),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PitFillParams {
    pub method: PitFillMethod,
    /// Minimum rise between a filled cell and the neighbour it drains to.
    /// Zero produces flat-filled depressions.
    pub epsilon: f64,
    /// Upper bound on Planchon-Darboux passes.
    pub max_iterations: usize,
}

impl Default for PitFillParams {
    fn default() -> PitFillParams {
        PitFillParams {
            method: PitFillMethod::PriorityFlood,
            epsilon: 1e-6,
            max_iterations: 10_000,
        }
    }
}

impl PitFillParams {
    fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0f64 {
            return Err(HydroError::Configuration(format!(
                "The fill epsilon must be a non-negative number (got {}).",
                self.epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(HydroError::Configuration(
                "The fill iteration bound must be at least 1.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PitFillReport {
    pub filled: Grid,
    pub cells_raised: usize,
    /// Passes over the grid; always 1 for priority-flood.
    pub iterations: usize,
    /// False when Planchon-Darboux stopped at its iteration bound.
    pub converged: bool,
}

/// The smallest value that is at least `epsilon` above `z` and strictly
/// above it whenever `epsilon > 0`, even where `z + epsilon` rounds back to `z`.
pub fn raise_above(z: f64, epsilon: f64) -> f64 {
    let raised = z + epsilon;
    if epsilon > 0f64 && raised <= z {
        next_up(z)
    } else {
        raised
    }
}

fn next_up(z: f64) -> f64 {
    if z.is_nan() || z == f64::INFINITY {
        return z;
    }
    if z == 0f64 {
        return f64::from_bits(1);
    }
    let bits = z.to_bits();
    if z > 0f64 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Raises depressions so every valid cell has a descending path to the grid
/// edge or to no-data. Edge cells and cells next to no-data are never changed.
///
/// With `epsilon > 0` every other cell ends strictly above at least one
/// neighbour, and filling a filled surface changes nothing.
///
/// A cancelled run returns the surface as far as it got: some depressions
/// may still be unfilled, and Planchon-Darboux cells that were never resolved
/// keep their input elevation.
pub fn fill_pits(dem: &Grid, params: &PitFillParams, runner: &mut TiledRunner) -> Result<Outcome<PitFillReport>> {
    params.validate()?;
    match params.method {
        PitFillMethod::PriorityFlood => priority_flood(dem, params.epsilon, runner),
        PitFillMethod::PlanchonDarboux => planchon_darboux(dem, params, runner),
    }
}

fn is_seed(dem: &Grid, row: isize, col: isize) -> bool {
    dem.is_boundary_cell(row, col)
}

fn priority_flood(dem: &Grid, epsilon: f64, runner: &mut TiledRunner) -> Result<Outcome<PitFillReport>> {
    let rows = dem.rows() as isize;
    let columns = dem.columns() as isize;
    let mut output = dem.clone();
    let mut closed: Array2D<u8> = Array2D::new(rows, columns, 0, 1)?;
    let mut heap = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut num_valid = 0usize;
    for row in 0..rows {
        for col in 0..columns {
            let z = dem.get_value(row, col);
            if dem.is_nodata(z) {
                closed.set_value(row, col, 1);
                continue;
            }
            num_valid += 1;
            if is_seed(dem, row, col) {
                closed.set_value(row, col, 1);
                heap.push(GridCell {
                    row,
                    column: col,
                    priority: z,
                    sequence,
                });
                sequence += 1;
            }
        }
    }

    let granule = runner.scheme().cells_per_tile(columns as usize);
    runner.monitor().begin_task("Filling pits", num_valid as i64);
    let mut cells_raised = 0usize;
    let mut num_solved = 0usize;
    while let Some(cell) = heap.pop() {
        let z = cell.priority;
        for (dr, dc) in NEIGHBOUR_OFFSETS.iter() {
            let (row_n, col_n) = (cell.row + dr, cell.column + dc);
            if closed.get_value(row_n, col_n) == 1 {
                continue;
            }
            closed.set_value(row_n, col_n, 1);
            let mut z_n = output[(row_n, col_n)];
            if z_n <= z {
                let raised = raise_above(z, epsilon);
                if raised > z_n {
                    cells_raised += 1;
                }
                z_n = raised;
                output.set_value(row_n as usize, col_n as usize, z_n);
            }
            heap.push(GridCell {
                row: row_n,
                column: col_n,
                priority: z_n,
                sequence,
            });
            sequence += 1;
        }
        num_solved += 1;
        if num_solved % granule == 0 {
            runner.monitor().worked(granule);
            if runner.is_cancelled() {
                tracing::warn!(num_solved, "pit filling cancelled");
                runner.monitor().done();
                return Ok(Outcome::Cancelled(PitFillReport {
                    filled: output,
                    cells_raised,
                    iterations: 1,
                    converged: false,
                }));
            }
        }
    }
    runner.monitor().worked(num_solved % granule);
    runner.monitor().done();

    Ok(Outcome::Completed(PitFillReport {
        filled: output,
        cells_raised,
        iterations: 1,
        converged: true,
    }))
}

fn planchon_darboux(dem: &Grid, params: &PitFillParams, runner: &mut TiledRunner) -> Result<Outcome<PitFillReport>> {
    let rows = dem.rows() as isize;
    let columns = dem.columns() as isize;
    let epsilon = params.epsilon;

    // water surface; starts infinitely high everywhere but the seeds
    let mut w = dem.clone();
    let mut open = Vec::new();
    for row in 0..rows {
        for col in 0..columns {
            let z = dem.get_value(row, col);
            if !dem.is_nodata(z) && !is_seed(dem, row, col) {
                w.set_value(row as usize, col as usize, f64::INFINITY);
                open.push((row, col));
            }
        }
    }

    runner.monitor().begin_task("Filling pits", -1);
    let mut iterations = 0usize;
    let mut converged = open.is_empty();
    while !converged && iterations < params.max_iterations {
        iterations += 1;
        let mut changed = false;
        let forward = iterations % 2 == 1;
        for k in 0..open.len() {
            let (row, col) = if forward { open[k] } else { open[open.len() - 1 - k] };
            let z = dem.get_value(row, col);
            let mut wc = w.get_value(row, col);
            if wc <= z {
                continue;
            }
            for (dr, dc) in NEIGHBOUR_OFFSETS.iter() {
                let w_n = w.get_value(row + dr, col + dc);
                if w.is_nodata(w_n) {
                    continue;
                }
                let candidate = raise_above(w_n, epsilon);
                if z >= candidate {
                    wc = z;
                    changed = true;
                    break;
                }
                if wc > candidate {
                    wc = candidate;
                    changed = true;
                }
            }
            w.set_value(row as usize, col as usize, wc);
        }
        runner.monitor().worked(1);
        if !changed {
            converged = true;
        } else if runner.is_cancelled() {
            tracing::warn!(iterations, "pit filling cancelled");
            runner.monitor().done();
            let cells_raised = settle(&mut w, dem, &open);
            return Ok(Outcome::Cancelled(PitFillReport {
                filled: w,
                cells_raised,
                iterations,
                converged: false,
            }));
        }
    }
    runner.monitor().done();

    if !converged {
        tracing::warn!(
            iterations,
            "pit filling stopped at its iteration bound before converging"
        );
    }
    let cells_raised = settle(&mut w, dem, &open);
    Ok(Outcome::Completed(PitFillReport {
        filled: w,
        cells_raised,
        iterations,
        converged,
    }))
}

/// Puts unresolved cells back to their input elevation and counts the raised ones.
fn settle(w: &mut Grid, dem: &Grid, open: &[(isize, isize)]) -> usize {
    let mut cells_raised = 0;
    for &(row, col) in open {
        let z = dem.get_value(row, col);
        let wc = w.get_value(row, col);
        if wc == f64::INFINITY {
            w.set_value(row as usize, col as usize, z);
        } else if wc > z {
            cells_raised += 1;
        }
    }
    cells_raised
}
