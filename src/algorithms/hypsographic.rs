/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::error::{HydroError, Result};
use crate::raster::Grid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypsographicPoint {
    pub elevation: f64,
    /// Map area at or above `elevation`.
    pub area: f64,
    /// Share of the valid cells at or above `elevation`.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HypsographicCurve {
    pub points: Vec<HypsographicPoint>,
    pub min: f64,
    pub max: f64,
    /// Hypsometric integral `(mean - min) / (max - min)`; `None` on a flat grid.
    pub integral: Option<f64>,
}

impl HypsographicCurve {
    /// The curve as `elevation,area,fraction` lines with a header.
    pub fn to_csv(&self) -> String {
        let mut s = String::from("elevation,area,fraction\n");
        for p in &self.points {
            s.push_str(&format!("{},{},{}\n", p.elevation, p.area, p.fraction));
        }
        s
    }
}

/// Area lying at or above `num_bins` equally spaced elevations from the
/// grid minimum to its maximum.
pub fn hypsographic_curve(dem: &Grid, num_bins: usize) -> Result<HypsographicCurve> {
    if num_bins == 0 {
        return Err(HydroError::Configuration(
            "The hypsographic curve needs at least one bin.".to_string(),
        ));
    }
    let mut values: Vec<f64> = dem
        .values()
        .iter()
        .copied()
        .filter(|z| !dem.is_nodata(*z))
        .collect();
    if values.is_empty() {
        return Err(HydroError::Configuration(
            "The DEM contains no valid cells.".to_string(),
        ));
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    let min = values[0];
    let max = values[n - 1];
    let cell_area = dem.region().resolution_x * dem.region().resolution_y;
    let step = if num_bins > 1 {
        (max - min) / (num_bins - 1) as f64
    } else {
        0f64
    };

    let points = (0..num_bins)
        .map(|k| {
            let elevation = if k == num_bins - 1 {
                max
            } else {
                min + k as f64 * step
            };
            let below = values.partition_point(|z| *z < elevation);
            let count = n - below;
            HypsographicPoint {
                elevation,
                area: count as f64 * cell_area,
                fraction: count as f64 / n as f64,
            }
        })
        .collect();

    let mean = values.iter().sum::<f64>() / n as f64;
    let integral = if max > min {
        Some((mean - min) / (max - min))
    } else {
        None
    };

    Ok(HypsographicCurve {
        points,
        min,
        max,
        integral,
    })
}
