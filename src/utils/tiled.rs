/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use super::progress::{NullProgress, ProgressMonitor};
use crate::error::{HydroError, Result};
use crate::raster::Grid;
use rayon::prelude::*;
use std::ops::Range;

/// How a pass is cut into row-bands ("tiles") and how many workers compute
/// the rows of one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileScheme {
    /// Rows per band; progress and cancellation are handled between bands.
    pub tile_rows: usize,
    /// Worker threads; 0 means one per logical CPU.
    pub num_procs: usize,
}

impl Default for TileScheme {
    fn default() -> TileScheme {
        TileScheme {
            tile_rows: 256,
            num_procs: 0,
        }
    }
}

impl TileScheme {
    pub fn new(tile_rows: usize, num_procs: usize) -> TileScheme {
        TileScheme {
            tile_rows: tile_rows.max(1),
            num_procs,
        }
    }

    pub fn bands(&self, rows: usize) -> RowBands {
        RowBands {
            next: 0,
            rows,
            tile_rows: self.tile_rows.max(1),
        }
    }

    /// Number of cells in one full band of a grid with `columns` columns.
    /// Serial passes use this as their cancellation/progress granule.
    pub fn cells_per_tile(&self, columns: usize) -> usize {
        (self.tile_rows.max(1) * columns).max(1)
    }
}

/// Iterator over consecutive row ranges covering `0..rows`.
#[derive(Debug, Clone)]
pub struct RowBands {
    next: usize,
    rows: usize,
    tile_rows: usize,
}

impl Iterator for RowBands {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.next >= self.rows {
            return None;
        }
        let start = self.next;
        let end = (start + self.tile_rows).min(self.rows);
        self.next = end;
        Some(start..end)
    }
}

/// Result of a cancellable pass.
///
/// A cancelled pass still hands back its output so the caller owns it; what
/// the partial output contains is documented by each operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled(T),
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    /// The output, whether or not the pass ran to completion.
    pub fn into_inner(self) -> T {
        match self {
            Outcome::Completed(v) | Outcome::Cancelled(v) => v,
        }
    }

    /// The output of a completed pass, `None` if it was cancelled.
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(v) => Some(v),
            Outcome::Cancelled(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Completed(v) => Outcome::Completed(f(v)),
            Outcome::Cancelled(v) => Outcome::Cancelled(f(v)),
        }
    }
}

fn build_pool(num_procs: usize) -> Result<rayon::ThreadPool> {
    let num_threads = if num_procs == 0 {
        num_cpus::get()
    } else {
        num_procs
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| HydroError::Configuration(format!("Could not start worker pool: {}", e)))
}

/// Drives operators over a grid one row-band at a time, reporting progress
/// to a `ProgressMonitor` and stopping early when it asks to cancel.
pub struct TiledRunner<'a> {
    scheme: TileScheme,
    monitor: Box<dyn ProgressMonitor + 'a>,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> TiledRunner<'a> {
    pub fn new(scheme: TileScheme, monitor: Box<dyn ProgressMonitor + 'a>) -> TiledRunner<'a> {
        TiledRunner {
            scheme,
            monitor,
            pool: None,
        }
    }

    /// A runner with the default tile scheme and no progress output.
    pub fn silent() -> TiledRunner<'static> {
        TiledRunner::new(TileScheme::default(), Box::new(NullProgress::default()))
    }

    pub fn scheme(&self) -> TileScheme {
        self.scheme
    }

    pub fn monitor(&mut self) -> &mut (dyn ProgressMonitor + 'a) {
        self.monitor.as_mut()
    }

    pub fn is_cancelled(&self) -> bool {
        self.monitor.is_cancelled()
    }

    /// Computes every row of `output` with `kernel`, one band at a time. Rows
    /// within a band are computed in parallel; there must be no dependency
    /// between output rows.
    ///
    /// On cancellation the rows of every finished band hold their final
    /// values and the remaining rows are left untouched.
    pub fn run_rows<F>(&mut self, task: &str, output: &mut Grid, kernel: F) -> Result<Outcome<()>>
    where
        F: Fn(usize) -> Result<Vec<f64>> + Sync + Send,
    {
        if self.pool.is_none() {
            self.pool = Some(build_pool(self.scheme.num_procs)?);
        }
        let rows = output.rows();
        self.monitor.begin_task(task, rows as i64);
        for band in self.scheme.bands(rows) {
            if self.monitor.is_cancelled() {
                tracing::warn!(task, row = band.start, "pass cancelled");
                self.monitor.done();
                return Ok(Outcome::Cancelled(()));
            }
            let band_rows = band.clone();
            let data = match self.pool.as_ref() {
                Some(pool) => pool.install(|| {
                    band_rows
                        .into_par_iter()
                        .map(|row| kernel(row))
                        .collect::<Result<Vec<Vec<f64>>>>()
                })?,
                None => band_rows
                    .map(|row| kernel(row))
                    .collect::<Result<Vec<Vec<f64>>>>()?,
            };
            for (row, values) in band.clone().zip(data) {
                output.set_row_data(row, values)?;
            }
            self.monitor.worked(band.len());
        }
        self.monitor.done();
        Ok(Outcome::Completed(()))
    }
}
