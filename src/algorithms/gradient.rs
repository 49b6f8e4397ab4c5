/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::error::Result;
use crate::raster::Grid;
use crate::utils::{Outcome, TiledRunner};

/// Finite-difference scheme used to estimate the surface derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientMode {
    /// Central differences over the four edge neighbours.
    #[default]
    Finite,
    /// Horn (1981) weighted 3x3 stencil.
    Horn,
    /// Evans (1980) unweighted 3x3 stencil.
    Evans,
}

impl GradientMode {
    pub fn from_name(name: &str) -> Option<GradientMode> {
        match name.to_lowercase().as_str() {
            "finite" | "central" => Some(GradientMode::Finite),
            "horn" => Some(GradientMode::Horn),
            "evans" => Some(GradientMode::Evans),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradientParams {
    pub mode: GradientMode,
}

/// Magnitude of the surface gradient, `sqrt(fx² + fy²)`, in elevation units
/// per horizontal unit.
///
/// Border cells are no-data, as is every cell whose stencil footprint holds a
/// no-data value: the four edge neighbours and the cell itself for `Finite`,
/// the full 3x3 window for `Horn` and `Evans`. Magnitudes are never negative,
/// so a non-negative DEM sentinel becomes `DEFAULT_NODATA` in the output.
pub fn gradient(dem: &Grid, params: &GradientParams, runner: &mut TiledRunner) -> Result<Outcome<Grid>> {
    let mut output = Grid::initialize_for_output(dem, |nd| nd >= 0f64);
    let rows = dem.rows() as isize;
    let columns = dem.columns() as isize;
    let nodata = output.nodata();
    let dx = dem.region().resolution_x;
    let dy = dem.region().resolution_y;
    let mode = params.mode;
    let outcome = runner.run_rows("Gradient", &mut output, |row| {
        let row = row as isize;
        let mut data = vec![nodata; columns as usize];
        if row == 0 || row == rows - 1 {
            return Ok(data);
        }
        for col in 1..columns - 1 {
            let window = match read_window(dem, row, col, mode) {
                Some(w) => w,
                None => continue,
            };
            let (fx, fy) = match mode {
                GradientMode::Finite => (
                    (window[5] - window[3]) / (2f64 * dx),
                    (window[7] - window[1]) / (2f64 * dy),
                ),
                GradientMode::Horn => (
                    ((window[2] + 2f64 * window[5] + window[8])
                        - (window[0] + 2f64 * window[3] + window[6]))
                        / (8f64 * dx),
                    ((window[6] + 2f64 * window[7] + window[8])
                        - (window[0] + 2f64 * window[1] + window[2]))
                        / (8f64 * dy),
                ),
                GradientMode::Evans => (
                    ((window[2] + window[5] + window[8]) - (window[0] + window[3] + window[6]))
                        / (6f64 * dx),
                    ((window[6] + window[7] + window[8]) - (window[0] + window[1] + window[2]))
                        / (6f64 * dy),
                ),
            };
            data[col as usize] = (fx * fx + fy * fy).sqrt();
        }
        Ok(data)
    })?;
    Ok(outcome.map(|_| output))
}

/// Reads the 3x3 window around (row, col) in row-major order, returning
/// `None` if any value the mode needs is no-data. Corner values are left at
/// zero for `Finite`, which does not read them.
fn read_window(dem: &Grid, row: isize, col: isize, mode: GradientMode) -> Option<[f64; 9]> {
    let mut window = [0f64; 9];
    for (k, value) in window.iter_mut().enumerate() {
        let dr = k as isize / 3 - 1;
        let dc = k as isize % 3 - 1;
        if mode == GradientMode::Finite && dr != 0 && dc != 0 {
            continue;
        }
        let z = dem.get_value(row + dr, col + dc);
        if dem.is_nodata(z) {
            return None;
        }
        *value = z;
    }
    Some(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::DEFAULT_NODATA;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const ND: f64 = -9999.0;

    fn run(dem: &Grid, mode: GradientMode) -> Grid {
        gradient(dem, &GradientParams { mode }, &mut TiledRunner::silent())
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_gradient_of_ramp() {
        let dem = Grid::from_rows(
            &[
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
            ],
            ND,
        )
        .unwrap();
        for mode in [GradientMode::Finite, GradientMode::Horn, GradientMode::Evans] {
            let out = run(&dem, mode);
            assert!((out.get(1, 1).unwrap() - 1.0).abs() < 1e-12);
            // borders are never computed
            assert_eq!(out.get(0, 1).unwrap(), ND);
            assert_eq!(out.get(1, 2).unwrap(), ND);
        }
    }

    #[test]
    fn test_gradient_uses_resolution() {
        let region = crate::raster::Region::from_resolution(0.0, 0.0, 2.0, 5.0, 3, 3).unwrap();
        let dem = Grid::from_data(
            region,
            ND,
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0],
        )
        .unwrap();
        let out = run(&dem, GradientMode::Finite);
        assert!((out.get(1, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_corner_nodata_only_affects_3x3_modes() {
        let dem = Grid::from_rows(
            &[
                vec![ND, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
            ],
            ND,
        )
        .unwrap();
        assert!(!dem.is_nodata(run(&dem, GradientMode::Finite).get(1, 1).unwrap()));
        assert_eq!(run(&dem, GradientMode::Horn).get(1, 1).unwrap(), ND);
        assert_eq!(run(&dem, GradientMode::Evans).get(1, 1).unwrap(), ND);
    }

    #[test]
    fn test_random_nodata_propagates() {
        let mut rng = SmallRng::seed_from_u64(7);
        let (rows, columns) = (25usize, 30usize);
        let mut values: Vec<f64> = (0..rows * columns).map(|_| rng.gen_range(0.0..50.0)).collect();
        for _ in 0..40 {
            let idx = rng.gen_range(0..rows * columns);
            values[idx] = ND;
        }
        let region = crate::raster::Region::from_resolution(0.0, 0.0, 1.0, 1.0, rows, columns).unwrap();
        let dem = Grid::from_data(region, ND, values).unwrap();
        let out = run(&dem, GradientMode::Finite);
        for row in 0..rows as isize {
            for col in 0..columns as isize {
                let footprint = [(0, 0), (0, 1), (0, -1), (1, 0), (-1, 0)];
                let touched = footprint
                    .iter()
                    .any(|(dr, dc)| dem.is_nodata(dem.get_value(row + dr, col + dc)));
                if touched {
                    assert!(out.is_nodata(out.get(row, col).unwrap()));
                }
            }
        }
    }

    #[test]
    fn test_zero_gradient_with_zero_sentinel() {
        let dem = Grid::from_rows(
            &[
                vec![0.0, 4.0, 4.0, 4.0],
                vec![4.0, 4.0, 4.0, 4.0],
                vec![4.0, 4.0, 4.0, 4.0],
            ],
            0.0,
        )
        .unwrap();
        let out = run(&dem, GradientMode::Finite);
        assert_eq!(out.nodata(), DEFAULT_NODATA);
        // the corner sentinel is outside the finite stencil of (1, 1)
        assert_eq!(out.get(1, 1).unwrap(), 0.0);
        assert!(!out.is_nodata(out.get(1, 1).unwrap()));
        assert!(out.is_nodata(run(&dem, GradientMode::Horn).get(1, 1).unwrap()));
        assert_eq!(run(&dem, GradientMode::Horn).get(1, 2).unwrap(), 0.0);

        // negative sentinels cannot collide and are kept
        let dem = Grid::from_rows(&[vec![4.0; 3], vec![4.0; 3], vec![4.0; 3]], ND).unwrap();
        assert_eq!(run(&dem, GradientMode::Evans).nodata(), ND);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(GradientMode::from_name("HORN"), Some(GradientMode::Horn));
        assert_eq!(GradientMode::from_name("finite"), Some(GradientMode::Finite));
        assert_eq!(GradientMode::from_name("sobel"), None);
    }
}
