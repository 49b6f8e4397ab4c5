/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

pub mod arcascii_raster;
pub mod whitebox_raster;

use crate::error::{HydroError, Result};
use crate::raster::arcascii_raster::*;
use crate::raster::whitebox_raster::*;
use std::f64;
use std::ops::Index;
use std::path::Path;

/// The default no-data sentinel for grids created without an explicit one.
pub const DEFAULT_NODATA: f64 = -32768.0;

/// Returns true when `value` is missing data for a grid whose sentinel is
/// `nodata`. NaN is always treated as missing, so arithmetic that produced a
/// NaN can never masquerade as a valid cell.
#[inline]
pub fn is_nodata(value: f64, nodata: f64) -> bool {
    value == nodata || value.is_nan()
}

/// Immutable geometry of a georeferenced raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution_x: f64,
    pub resolution_y: f64,
    pub rows: usize,
    pub columns: usize,
}

impl Region {
    /// Creates a region from its bounds and cell counts; resolutions are derived.
    pub fn new(
        north: f64,
        south: f64,
        east: f64,
        west: f64,
        rows: usize,
        columns: usize,
    ) -> Result<Region> {
        if rows == 0 || columns == 0 {
            return Err(HydroError::Configuration(format!(
                "A region needs at least one row and column (got {} x {}).",
                rows, columns
            )));
        }
        if !(north > south) || !(east > west) || !north.is_finite() || !south.is_finite()
            || !east.is_finite() || !west.is_finite()
        {
            return Err(HydroError::Configuration(format!(
                "Invalid region bounds: n={} s={} e={} w={}",
                north, south, east, west
            )));
        }
        Ok(Region {
            north,
            south,
            east,
            west,
            resolution_x: (east - west) / columns as f64,
            resolution_y: (north - south) / rows as f64,
            rows,
            columns,
        })
    }

    /// Creates a region anchored at its lower-left corner.
    pub fn from_resolution(
        west: f64,
        south: f64,
        resolution_x: f64,
        resolution_y: f64,
        rows: usize,
        columns: usize,
    ) -> Result<Region> {
        if !(resolution_x > 0.0) || !(resolution_y > 0.0) {
            return Err(HydroError::Configuration(format!(
                "Resolutions must be strictly positive (got {}, {}).",
                resolution_x, resolution_y
            )));
        }
        let mut region = Region::new(
            south + rows as f64 * resolution_y,
            south,
            west + columns as f64 * resolution_x,
            west,
            rows,
            columns,
        )?;
        // keep the caller's exact resolution rather than the re-derived quotient
        region.resolution_x = resolution_x;
        region.resolution_y = resolution_y;
        Ok(region)
    }

    /// Derives a region for output with a different extent and resolution.
    /// The row and column counts are rounded from the extent.
    pub fn derive_write_region(
        &self,
        north: f64,
        south: f64,
        east: f64,
        west: f64,
        resolution_x: f64,
        resolution_y: f64,
    ) -> Result<Region> {
        if !(resolution_x > 0.0) || !(resolution_y > 0.0) {
            return Err(HydroError::Configuration(format!(
                "Resolutions must be strictly positive (got {}, {}).",
                resolution_x, resolution_y
            )));
        }
        let columns = ((east - west) / resolution_x).round();
        let rows = ((north - south) / resolution_y).round();
        if !(rows >= 1.0) || !(columns >= 1.0) {
            return Err(HydroError::Configuration(
                "The write region extent is smaller than one cell.".to_string(),
            ));
        }
        Region::from_resolution(
            west,
            south,
            resolution_x,
            resolution_y,
            rows as usize,
            columns as usize,
        )
    }

    pub fn num_cells(&self) -> usize {
        self.rows * self.columns
    }

    /// Distance between the centres of two diagonally adjacent cells.
    pub fn diagonal_resolution(&self) -> f64 {
        (self.resolution_x * self.resolution_x + self.resolution_y * self.resolution_y).sqrt()
    }

    /// True when both regions describe grids with the same rows and columns.
    pub fn same_shape(&self, other: &Region) -> bool {
        self.rows == other.rows && self.columns == other.columns
    }
}

/// A dense, row-major matrix of cell values tied to one `Region`.
#[derive(Debug, Clone)]
pub struct Grid {
    region: Region,
    nodata: f64,
    data: Vec<f64>,
    /// Coordinate reference metadata; carried through untouched.
    pub coordinate_ref_system_wkt: Option<String>,
}

impl Index<(isize, isize)> for Grid {
    type Output = f64;

    /// Neighbourhood access: positions off the grid read as no-data.
    fn index(&self, index: (isize, isize)) -> &f64 {
        let (row, column) = index;
        if row < 0 || column < 0 {
            return &self.nodata;
        }
        let (r, c) = (row as usize, column as usize);
        if r >= self.region.rows || c >= self.region.columns {
            return &self.nodata;
        }
        &self.data[r * self.region.columns + c]
    }
}

impl Grid {
    /// Creates a grid covering `region` with every cell set to `fill_value`.
    pub fn new(region: Region, fill_value: f64) -> Grid {
        Grid::new_with_nodata(region, fill_value, DEFAULT_NODATA)
    }

    pub fn new_with_nodata(region: Region, fill_value: f64, nodata: f64) -> Grid {
        Grid {
            region,
            nodata,
            data: vec![fill_value; region.num_cells()],
            coordinate_ref_system_wkt: None,
        }
    }

    /// Builds a grid from row-major values.
    pub fn from_data(region: Region, nodata: f64, data: Vec<f64>) -> Result<Grid> {
        if data.len() != region.num_cells() {
            return Err(HydroError::InvalidData(format!(
                "Expected {} values for a {} x {} grid but found {}.",
                region.num_cells(),
                region.rows,
                region.columns,
                data.len()
            )));
        }
        Ok(Grid {
            region,
            nodata,
            data,
            coordinate_ref_system_wkt: None,
        })
    }

    /// Builds a unit-resolution grid from nested rows; handy for small inputs.
    pub fn from_rows(rows: &[Vec<f64>], nodata: f64) -> Result<Grid> {
        let num_rows = rows.len();
        let num_columns = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != num_columns) {
            return Err(HydroError::InvalidData(
                "All rows must have the same number of columns.".to_string(),
            ));
        }
        let region = Region::from_resolution(0.0, 0.0, 1.0, 1.0, num_rows, num_columns)?;
        Grid::from_data(region, nodata, rows.concat())
    }

    /// Creates an output grid sharing the geometry, sentinel and CRS of `other`,
    /// with every cell set to no-data.
    pub fn initialize_using_grid(other: &Grid) -> Grid {
        Grid {
            region: other.region,
            nodata: other.nodata,
            data: vec![other.nodata; other.region.num_cells()],
            coordinate_ref_system_wkt: other.coordinate_ref_system_wkt.clone(),
        }
    }

    /// Like `initialize_using_grid`, but switches to `DEFAULT_NODATA` when
    /// `reserved` says the input sentinel may also be a valid output value.
    pub fn initialize_for_output<F>(other: &Grid, reserved: F) -> Grid
    where
        F: Fn(f64) -> bool,
    {
        let mut grid = Grid::initialize_using_grid(other);
        if reserved(grid.nodata) {
            grid.nodata = DEFAULT_NODATA;
            grid.data.iter_mut().for_each(|v| *v = DEFAULT_NODATA);
        }
        grid
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn rows(&self) -> usize {
        self.region.rows
    }

    pub fn columns(&self) -> usize {
        self.region.columns
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    pub fn num_cells(&self) -> usize {
        self.data.len()
    }

    /// The single no-data predicate used by every operator.
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        is_nodata(value, self.nodata)
    }

    #[inline]
    fn checked_index(&self, row: isize, column: isize) -> Result<usize> {
        if row < 0
            || column < 0
            || row as usize >= self.region.rows
            || column as usize >= self.region.columns
        {
            return Err(HydroError::OutOfBounds {
                row,
                col: column,
                rows: self.region.rows,
                cols: self.region.columns,
            });
        }
        Ok(row as usize * self.region.columns + column as usize)
    }

    /// Bounds-checked read.
    pub fn get(&self, row: isize, column: isize) -> Result<f64> {
        let idx = self.checked_index(row, column)?;
        Ok(self.data[idx])
    }

    /// Bounds-checked write.
    pub fn set(&mut self, row: isize, column: isize, value: f64) -> Result<()> {
        let idx = self.checked_index(row, column)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Neighbourhood read; off-grid positions return the no-data value.
    #[inline]
    pub fn get_value(&self, row: isize, column: isize) -> f64 {
        self[(row, column)]
    }

    /// Adds `value` to a cell. Off-grid positions are ignored.
    pub(crate) fn increment(&mut self, row: usize, column: usize, value: f64) {
        if row < self.region.rows && column < self.region.columns {
            self.data[row * self.region.columns + column] += value;
        }
    }

    pub(crate) fn set_value(&mut self, row: usize, column: usize, value: f64) {
        if row < self.region.rows && column < self.region.columns {
            self.data[row * self.region.columns + column] = value;
        }
    }

    pub fn get_row_data(&self, row: usize) -> &[f64] {
        let columns = self.region.columns;
        &self.data[row * columns..(row + 1) * columns]
    }

    pub fn set_row_data(&mut self, row: usize, values: Vec<f64>) -> Result<()> {
        if row >= self.region.rows || values.len() != self.region.columns {
            return Err(HydroError::OutOfBounds {
                row: row as isize,
                col: values.len() as isize,
                rows: self.region.rows,
                cols: self.region.columns,
            });
        }
        let columns = self.region.columns;
        self.data[row * columns..(row + 1) * columns].copy_from_slice(&values);
        Ok(())
    }

    /// Row-major view of all cell values, including no-data cells.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Returns an error unless `other` has the same rows and columns.
    pub fn check_same_dimensions(&self, other: &Grid) -> Result<()> {
        if !self.region.same_shape(&other.region) {
            return Err(HydroError::DimensionMismatch {
                er: self.region.rows,
                ec: self.region.columns,
                ar: other.region.rows,
                ac: other.region.columns,
            });
        }
        Ok(())
    }

    pub fn num_valid_cells(&self) -> usize {
        self.data.iter().filter(|v| !self.is_nodata(**v)).count()
    }

    /// Sum over valid cells.
    pub fn sum_valid(&self) -> f64 {
        self.data
            .iter()
            .filter(|v| !self.is_nodata(**v))
            .sum()
    }

    /// Minimum and maximum over valid cells, `None` if every cell is no-data.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.data {
            if !self.is_nodata(v) {
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }
        }
        if min <= max {
            Some((min, max))
        } else {
            None
        }
    }

    /// True if the cell lies on the grid edge or touches a no-data cell.
    pub fn is_boundary_cell(&self, row: isize, column: isize) -> bool {
        if row <= 0
            || column <= 0
            || row >= self.region.rows as isize - 1
            || column >= self.region.columns as isize - 1
        {
            return true;
        }
        for (dr, dc) in NEIGHBOUR_OFFSETS.iter() {
            if self.is_nodata(self.get_value(row + dr, column + dc)) {
                return true;
            }
        }
        false
    }
}

/// The eight (row, column) neighbour offsets, clockwise from the east.
pub const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterType {
    ArcAscii,
    Whitebox,
    Unknown,
}

impl Default for RasterType {
    fn default() -> RasterType {
        RasterType::Unknown
    }
}

pub fn get_raster_type_from_file(file_name: &str) -> RasterType {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_ref() {
        "asc" | "txt" => RasterType::ArcAscii,
        "dep" | "tas" => RasterType::Whitebox,
        _ => RasterType::Unknown,
    }
}

/// Something grids can be loaded from.
pub trait GridSource {
    fn load_grid(&self, file_name: &str) -> Result<Grid>;
}

/// Something grids can be stored to.
pub trait GridSink {
    fn store_grid(&self, grid: &Grid, file_name: &str) -> Result<()>;
}

/// Reads and writes grids on the local file system, choosing the codec from
/// the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileGridStore;

impl GridSource for FileGridStore {
    fn load_grid(&self, file_name: &str) -> Result<Grid> {
        match get_raster_type_from_file(file_name) {
            RasterType::ArcAscii => read_arcascii(file_name),
            RasterType::Whitebox => read_whitebox(file_name),
            RasterType::Unknown => Err(HydroError::InvalidData(format!(
                "Unrecognized raster type: {}",
                file_name
            ))),
        }
    }
}

impl GridSink for FileGridStore {
    fn store_grid(&self, grid: &Grid, file_name: &str) -> Result<()> {
        match get_raster_type_from_file(file_name) {
            RasterType::ArcAscii => write_arcascii(grid, file_name),
            RasterType::Whitebox => write_whitebox(grid, file_name),
            RasterType::Unknown => Err(HydroError::InvalidData(format!(
                "Unrecognized raster type: {}",
                file_name
            ))),
        }
    }
}
