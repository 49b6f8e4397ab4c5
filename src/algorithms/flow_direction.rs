/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::error::{HydroError, Result};
use crate::raster::{Grid, Region};
use crate::utils::{Outcome, TiledRunner};

/// Code written to boundary cells that have no lower neighbour.
pub const OUTLET_CODE: f64 = 10.0;

/// Code written to interior cells that have no lower neighbour (pits and flats).
pub const NO_FLOW_CODE: f64 = 0.0;

/// One of the eight D8 directions. Codes run counter-clockwise from the east:
///
/// | .  |  .  |  . |
/// |:--:|:---:|:--:|
/// | 4  |  3  | 2  |
/// | 5  |  .  | 1  |
/// | 6  |  7  | 8  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl FlowDirection {
    /// All directions in code order.
    pub const ALL: [FlowDirection; 8] = [
        FlowDirection::East,
        FlowDirection::NorthEast,
        FlowDirection::North,
        FlowDirection::NorthWest,
        FlowDirection::West,
        FlowDirection::SouthWest,
        FlowDirection::South,
        FlowDirection::SouthEast,
    ];

    pub fn code(self) -> u8 {
        match self {
            FlowDirection::East => 1,
            FlowDirection::NorthEast => 2,
            FlowDirection::North => 3,
            FlowDirection::NorthWest => 4,
            FlowDirection::West => 5,
            FlowDirection::SouthWest => 6,
            FlowDirection::South => 7,
            FlowDirection::SouthEast => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<FlowDirection> {
        match code {
            1..=8 => Some(FlowDirection::ALL[code as usize - 1]),
            _ => None,
        }
    }

    /// (row, column) offset of the receiving neighbour. Rows grow southwards.
    pub fn offset(self) -> (isize, isize) {
        match self {
            FlowDirection::East => (0, 1),
            FlowDirection::NorthEast => (-1, 1),
            FlowDirection::North => (-1, 0),
            FlowDirection::NorthWest => (-1, -1),
            FlowDirection::West => (0, -1),
            FlowDirection::SouthWest => (1, -1),
            FlowDirection::South => (1, 0),
            FlowDirection::SouthEast => (1, 1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        let (dr, dc) = self.offset();
        dr != 0 && dc != 0
    }

    /// Distance between the centres of a cell and its receiving neighbour.
    pub fn distance(self, region: &Region) -> f64 {
        match self {
            FlowDirection::East | FlowDirection::West => region.resolution_x,
            FlowDirection::North | FlowDirection::South => region.resolution_y,
            _ => region.diagonal_resolution(),
        }
    }

    /// The direction pointing back at the sender.
    pub fn reverse(self) -> FlowDirection {
        FlowDirection::ALL[(self.code() as usize + 3) % 8]
    }
}

/// A decoded cell of a flow-direction grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowCode {
    NoData,
    NoFlow,
    Outlet,
    Towards(FlowDirection),
}

impl FlowCode {
    pub fn to_value(self, nodata: f64) -> f64 {
        match self {
            FlowCode::NoData => nodata,
            FlowCode::NoFlow => NO_FLOW_CODE,
            FlowCode::Outlet => OUTLET_CODE,
            FlowCode::Towards(dir) => dir.code() as f64,
        }
    }
}

/// Reads the flow code of a cell. Any value other than no-data, 0, 10 or
/// 1..=8 means the grid is not a flow-direction grid.
pub fn decode_flow(flow: &Grid, row: usize, column: usize) -> Result<FlowCode> {
    let value = flow.get_value(row as isize, column as isize);
    if flow.is_nodata(value) {
        return Ok(FlowCode::NoData);
    }
    if value == NO_FLOW_CODE {
        return Ok(FlowCode::NoFlow);
    }
    if value == OUTLET_CODE {
        return Ok(FlowCode::Outlet);
    }
    if value.fract() == 0.0 && value >= 1.0 && value <= 8.0 {
        if let Some(dir) = FlowDirection::from_code(value as u8) {
            return Ok(FlowCode::Towards(dir));
        }
    }
    Err(HydroError::InvalidData(format!(
        "Invalid flow direction code {} at cell ({}, {})",
        value, row, column
    )))
}

/// The cell that (row, column) drains into, or `None` when the cell is
/// terminal. Directions pointing off the grid or into a no-data flow cell
/// make the cell terminal.
pub fn downstream_cell(flow: &Grid, row: usize, column: usize) -> Result<Option<(usize, usize)>> {
    match decode_flow(flow, row, column)? {
        FlowCode::Towards(dir) => {
            let (dr, dc) = dir.offset();
            let (row_n, col_n) = (row as isize + dr, column as isize + dc);
            if row_n < 0
                || col_n < 0
                || row_n as usize >= flow.rows()
                || col_n as usize >= flow.columns()
                || flow.is_nodata(flow.get_value(row_n, col_n))
            {
                return Ok(None);
            }
            Ok(Some((row_n as usize, col_n as usize)))
        }
        _ => Ok(None),
    }
}

/// Creates an empty flow-direction grid on the geometry of `dem`. The DEM's
/// sentinel is kept unless it collides with a flow code.
pub fn initialize_flow_grid(dem: &Grid) -> Grid {
    Grid::initialize_for_output(dem, |nd| {
        nd.fract() == 0.0 && nd >= NO_FLOW_CODE && nd <= OUTLET_CODE
    })
}

#[derive(Debug, Clone)]
pub struct D8Output {
    pub directions: Grid,
    /// Interior cells left without a downhill neighbour (code 0).
    pub interior_pits: usize,
}

/// Steepest-descent (D8) flow directions. Each valid cell points at the
/// neighbour with the greatest positive drop per unit distance; ties go to
/// the first direction in code order. Cells with no lower neighbour become
/// outlets on the boundary (grid edge or next to no-data) and no-flow cells
/// in the interior.
pub fn d8_flow_directions(dem: &Grid, runner: &mut TiledRunner) -> Result<Outcome<D8Output>> {
    let mut directions = initialize_flow_grid(dem);
    let out_nodata = directions.nodata();
    let region = *dem.region();
    let columns = dem.columns();
    let outcome = runner.run_rows("Flow directions", &mut directions, |row| {
        let mut data = vec![out_nodata; columns];
        let r = row as isize;
        for col in 0..columns {
            let c = col as isize;
            let z = dem.get_value(r, c);
            if dem.is_nodata(z) {
                continue;
            }
            let mut max_slope = 0f64;
            let mut code = FlowCode::NoFlow;
            for dir in FlowDirection::ALL.iter() {
                let (dr, dc) = dir.offset();
                let z_n = dem.get_value(r + dr, c + dc);
                if dem.is_nodata(z_n) {
                    continue;
                }
                let slope = (z - z_n) / dir.distance(&region);
                if slope > max_slope {
                    max_slope = slope;
                    code = FlowCode::Towards(*dir);
                }
            }
            if code == FlowCode::NoFlow && dem.is_boundary_cell(r, c) {
                code = FlowCode::Outlet;
            }
            data[col] = code.to_value(out_nodata);
        }
        Ok(data)
    })?;

    let interior_pits = directions
        .values()
        .iter()
        .filter(|v| **v == NO_FLOW_CODE)
        .count();
    if interior_pits > 0 && !outcome.is_cancelled() {
        tracing::warn!(
            interior_pits,
            "DEM contains interior pits; consider filling it before routing flow"
        );
    }
    Ok(outcome.map(|_| D8Output {
        directions,
        interior_pits,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::DEFAULT_NODATA;

    fn runner() -> TiledRunner<'static> {
        TiledRunner::silent()
    }

    #[test]
    fn test_codes_and_offsets() {
        for dir in FlowDirection::ALL.iter() {
            assert_eq!(FlowDirection::from_code(dir.code()), Some(*dir));
            let (dr, dc) = dir.offset();
            let (rr, rc) = dir.reverse().offset();
            assert_eq!((dr + rr, dc + rc), (0, 0));
        }
        assert_eq!(FlowDirection::from_code(0), None);
        assert_eq!(FlowDirection::from_code(9), None);
        assert!(FlowDirection::NorthWest.is_diagonal());
        assert!(!FlowDirection::South.is_diagonal());
    }

    #[test]
    fn test_distance_uses_resolution() {
        let region = Region::from_resolution(0.0, 0.0, 3.0, 4.0, 2, 2).unwrap();
        assert_eq!(FlowDirection::East.distance(&region), 3.0);
        assert_eq!(FlowDirection::North.distance(&region), 4.0);
        assert_eq!(FlowDirection::SouthWest.distance(&region), 5.0);
    }

    #[test]
    fn test_decode_flow() {
        let flow = Grid::from_rows(&[vec![1.0, 10.0, 0.0, -1.0, 2.5]], -1.0).unwrap();
        assert_eq!(
            decode_flow(&flow, 0, 0).unwrap(),
            FlowCode::Towards(FlowDirection::East)
        );
        assert_eq!(decode_flow(&flow, 0, 1).unwrap(), FlowCode::Outlet);
        assert_eq!(decode_flow(&flow, 0, 2).unwrap(), FlowCode::NoFlow);
        assert_eq!(decode_flow(&flow, 0, 3).unwrap(), FlowCode::NoData);
        assert!(matches!(
            decode_flow(&flow, 0, 4),
            Err(HydroError::InvalidData(_))
        ));
    }

    #[test]
    fn test_downstream_cell_terminates_off_grid_and_at_nodata() {
        // east, east into no-data, north off the grid
        let flow = Grid::from_rows(&[vec![1.0, 1.0, -1.0, 3.0]], -1.0).unwrap();
        assert_eq!(downstream_cell(&flow, 0, 0).unwrap(), Some((0, 1)));
        assert_eq!(downstream_cell(&flow, 0, 1).unwrap(), None);
        assert_eq!(downstream_cell(&flow, 0, 3).unwrap(), None);
    }

    #[test]
    fn test_d8_on_tilted_plane() {
        // elevation falls to the east
        let dem = Grid::from_rows(
            &[
                vec![3.0, 2.0, 1.0],
                vec![3.0, 2.0, 1.0],
                vec![3.0, 2.0, 1.0],
            ],
            -9999.0,
        )
        .unwrap();
        let out = d8_flow_directions(&dem, &mut runner())
            .unwrap()
            .into_inner();
        assert_eq!(out.interior_pits, 0);
        assert_eq!(out.directions.get(1, 1).unwrap(), 1.0);
        assert_eq!(out.directions.get(0, 0).unwrap(), 1.0);
        assert_eq!(out.directions.get(1, 2).unwrap(), OUTLET_CODE);
    }

    #[test]
    fn test_d8_prefers_steepest_and_marks_pits() {
        let dem = Grid::from_rows(
            &[
                vec![9.0, 9.0, 9.0, 9.0],
                vec![9.0, 1.0, 5.0, 9.0],
                vec![9.0, 9.0, 9.0, 0.0],
                vec![9.0, 9.0, 9.0, 9.0],
            ],
            -9999.0,
        )
        .unwrap();
        let out = d8_flow_directions(&dem, &mut runner())
            .unwrap()
            .into_inner();
        // (1, 1) is a pit; (1, 2) drains west to it
        assert_eq!(out.directions.get(1, 1).unwrap(), NO_FLOW_CODE);
        assert_eq!(out.directions.get(1, 2).unwrap(), 5.0);
        assert_eq!(out.directions.get(2, 3).unwrap(), OUTLET_CODE);
        assert_eq!(out.interior_pits, 1);
    }

    #[test]
    fn test_d8_nodata_and_sentinel_collision() {
        let dem = Grid::from_rows(&[vec![0.0, 5.0], vec![4.0, 3.0]], 0.0).unwrap();
        let out = d8_flow_directions(&dem, &mut runner())
            .unwrap()
            .into_inner();
        let flow = out.directions;
        assert_eq!(flow.nodata(), DEFAULT_NODATA);
        assert!(flow.is_nodata(flow.get(0, 0).unwrap()));
        assert_eq!(flow.get(0, 1).unwrap(), 7.0);
        assert_eq!(flow.get(1, 1).unwrap(), OUTLET_CODE);
    }
}
