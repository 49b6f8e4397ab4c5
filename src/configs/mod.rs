/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::error::{HydroError, Result};
use crate::utils::TileScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment settings. Backed by a settings.json file in the current directory.
/// Only the tool layer reads these; library operators take explicit parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    /// Worker threads for row-parallel passes; -1 uses every core.
    pub max_procs: isize,
    /// Height of the row-bands used for progress and cancellation.
    pub tile_rows: usize,
    pub pit_fill_epsilon: f64,
    pub pit_fill_max_iterations: usize,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: false,
            working_directory: String::new(),
            max_procs: -1,
            tile_rows: 256,
            pit_fill_epsilon: 1e-6,
            pit_fill_max_iterations: 10_000,
        }
    }
}

impl Configs {
    pub fn new() -> Configs {
        Configs::default()
    }

    pub fn tile_scheme(&self) -> TileScheme {
        let num_procs = if self.max_procs > 0 {
            self.max_procs as usize
        } else {
            0
        };
        TileScheme::new(self.tile_rows, num_procs)
    }
}

fn settings_file() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join("settings.json"))
}

/// Loads settings.json from the current directory, or the defaults if there is none.
pub fn get_configs() -> Result<Configs> {
    get_configs_from(&settings_file()?)
}

pub fn get_configs_from(config_file: &Path) -> Result<Configs> {
    match fs::read_to_string(config_file) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            HydroError::Configuration(format!(
                "Failed to parse {}: {}",
                config_file.display(),
                e
            ))
        }),
        Err(_) => Ok(Configs::new()),
    }
}

pub fn save_configs(configs: &Configs) -> Result<()> {
    save_configs_to(configs, &settings_file()?)
}

pub fn save_configs_to(configs: &Configs, config_file: &Path) -> Result<()> {
    let configs_json = serde_json::to_string_pretty(configs).map_err(|e| {
        HydroError::Configuration(format!("Error converting settings to JSON: {}", e))
    })?;
    fs::write(config_file, configs_json)?;
    Ok(())
}
