/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::error::{HydroError, Result};
use crate::raster::Grid;
use crate::utils::{Outcome, TiledRunner};

pub const CONCAVE_CLASS: f64 = 1.0;
pub const PLANAR_CLASS: f64 = 0.0;
pub const CONVEX_CLASS: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NablaMode {
    /// The real-valued discrete Laplacian.
    #[default]
    Laplacian,
    /// Concave (1), planar (0) or convex (-1) against a threshold.
    Classify,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NablaParams {
    pub mode: NablaMode,
    /// Half-width of the planar band; required by `Classify`.
    pub threshold: Option<f64>,
}

impl NablaParams {
    fn classify_threshold(&self) -> Result<Option<f64>> {
        match (self.mode, self.threshold) {
            (NablaMode::Laplacian, _) => Ok(None),
            (NablaMode::Classify, None) => Err(HydroError::Configuration(
                "Nabla classification requires a threshold.".to_string(),
            )),
            (NablaMode::Classify, Some(th)) if !th.is_finite() || th < 0f64 => {
                Err(HydroError::Configuration(format!(
                    "The nabla threshold must be a non-negative number (got {}).",
                    th
                )))
            }
            (NablaMode::Classify, Some(th)) => Ok(Some(th)),
        }
    }
}

/// Five-point discrete Laplacian
/// `(f(i,j+1) - 2f + f(i,j-1))/dx² + (f(i+1,j) - 2f + f(i-1,j))/dy²`,
/// or its classification when `Classify` is requested. Border cells and cells
/// touching no-data in the stencil are no-data.
///
/// The output keeps the DEM's sentinel unless it could be a real result: a
/// class value when classifying, or zero (flat ground) for the Laplacian.
pub fn nabla(dem: &Grid, params: &NablaParams, runner: &mut TiledRunner) -> Result<Outcome<Grid>> {
    let threshold = params.classify_threshold()?;
    let mut output = Grid::initialize_for_output(dem, |nd| match threshold {
        Some(_) => [CONCAVE_CLASS, PLANAR_CLASS, CONVEX_CLASS].contains(&nd),
        None => nd == 0f64,
    });
    let rows = dem.rows() as isize;
    let columns = dem.columns() as isize;
    let nodata = output.nodata();
    let dx2 = dem.region().resolution_x * dem.region().resolution_x;
    let dy2 = dem.region().resolution_y * dem.region().resolution_y;
    let outcome = runner.run_rows("Nabla", &mut output, |row| {
        let row = row as isize;
        let mut data = vec![nodata; columns as usize];
        if row == 0 || row == rows - 1 {
            return Ok(data);
        }
        for col in 1..columns - 1 {
            let z = dem.get_value(row, col);
            let east = dem.get_value(row, col + 1);
            let west = dem.get_value(row, col - 1);
            let north = dem.get_value(row - 1, col);
            let south = dem.get_value(row + 1, col);
            if [z, east, west, north, south].iter().any(|v| dem.is_nodata(*v)) {
                continue;
            }
            let laplacian = (east - 2f64 * z + west) / dx2 + (south - 2f64 * z + north) / dy2;
            data[col as usize] = match threshold {
                None => laplacian,
                Some(th) => {
                    if laplacian > th {
                        CONCAVE_CLASS
                    } else if laplacian < -th {
                        CONVEX_CLASS
                    } else {
                        PLANAR_CLASS
                    }
                }
            };
        }
        Ok(data)
    })?;
    Ok(outcome.map(|_| output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Region, DEFAULT_NODATA};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const ND: f64 = -9999.0;

    fn bowl() -> Grid {
        Grid::from_rows(
            &[
                vec![5.0, 4.0, 5.0],
                vec![4.0, 1.0, 4.0],
                vec![5.0, 4.0, 5.0],
            ],
            ND,
        )
        .unwrap()
    }

    #[test]
    fn test_laplacian_of_bowl() {
        let out = nabla(&bowl(), &NablaParams::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), 12.0);
        assert_eq!(out.get(0, 0).unwrap(), ND);
    }

    #[test]
    fn test_classification() {
        let params = NablaParams {
            mode: NablaMode::Classify,
            threshold: Some(0.5),
        };
        let out = nabla(&bowl(), &params, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), CONCAVE_CLASS);

        let mut dome = bowl();
        dome.set(1, 1, 7.0).unwrap();
        let out = nabla(&dome, &params, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), CONVEX_CLASS);

        let plane = Grid::from_rows(
            &[
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
            ],
            ND,
        )
        .unwrap();
        let out = nabla(&plane, &params, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), PLANAR_CLASS);
    }

    #[test]
    fn test_classify_without_threshold_is_configuration_error() {
        let params = NablaParams {
            mode: NablaMode::Classify,
            threshold: None,
        };
        assert!(matches!(
            nabla(&bowl(), &params, &mut TiledRunner::silent()),
            Err(HydroError::Configuration(_))
        ));
        let params = NablaParams {
            mode: NablaMode::Classify,
            threshold: Some(-1.0),
        };
        assert!(matches!(
            nabla(&bowl(), &params, &mut TiledRunner::silent()),
            Err(HydroError::Configuration(_))
        ));
    }

    #[test]
    fn test_nodata_neighbour() {
        let mut dem = bowl();
        dem.set(0, 1, ND).unwrap();
        let out = nabla(&dem, &NablaParams::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), ND);
    }

    #[test]
    fn test_class_values_never_read_as_nodata() {
        let params = NablaParams {
            mode: NablaMode::Classify,
            threshold: Some(0.5),
        };
        let flat = Grid::from_rows(&[vec![3.0; 3], vec![3.0; 3], vec![3.0; 3]], 0.0).unwrap();
        let out = nabla(&flat, &params, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.nodata(), DEFAULT_NODATA);
        assert_eq!(out.get(1, 1).unwrap(), PLANAR_CLASS);
        assert!(!out.is_nodata(out.get(1, 1).unwrap()));
        assert!(out.is_nodata(out.get(0, 0).unwrap()));

        let dome = Grid::from_rows(
            &[
                vec![5.0, 4.0, 5.0],
                vec![4.0, 7.0, 4.0],
                vec![5.0, 4.0, 5.0],
            ],
            -1.0,
        )
        .unwrap();
        let out = nabla(&dome, &params, &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), CONVEX_CLASS);
        assert!(!out.is_nodata(out.get(1, 1).unwrap()));

        // -1 is only a class value, so the Laplacian keeps it
        let out = nabla(&dome, &NablaParams::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.nodata(), -1.0);
        assert_eq!(out.get(1, 1).unwrap(), -12.0);

        // the Laplacian of flat ground is a real zero
        let out = nabla(&flat, &NablaParams::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        assert_eq!(out.get(1, 1).unwrap(), 0.0);
        assert!(!out.is_nodata(out.get(1, 1).unwrap()));
    }

    #[test]
    fn test_random_nodata_propagates() {
        let mut rng = SmallRng::seed_from_u64(7);
        let (rows, columns) = (20usize, 24usize);
        let mut values: Vec<f64> = (0..rows * columns).map(|_| rng.gen_range(0.0..50.0)).collect();
        for _ in 0..35 {
            let idx = rng.gen_range(0..rows * columns);
            values[idx] = ND;
        }
        let region = Region::from_resolution(0.0, 0.0, 1.0, 2.0, rows, columns).unwrap();
        let dem = Grid::from_data(region, ND, values).unwrap();
        let out = nabla(&dem, &NablaParams::default(), &mut TiledRunner::silent())
            .unwrap()
            .into_inner();
        let footprint = [(0, 0), (0, 1), (0, -1), (1, 0), (-1, 0)];
        for row in 0..rows as isize {
            for col in 0..columns as isize {
                let touched = footprint
                    .iter()
                    .any(|(dr, dc)| dem.is_nodata(dem.get_value(row + dr, col + dc)));
                let value = out.get(row, col).unwrap();
                if touched {
                    assert!(out.is_nodata(value), "({}, {}) should be no-data", row, col);
                } else {
                    assert!(value.is_finite() && !out.is_nodata(value));
                }
            }
        }
    }
}
