/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::{fill_pits, PitFillMethod, PitFillParams};
use crate::configs;
use crate::error::{HydroError, Result};
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool removes depressions from a DEM (`--dem`) so that every valid cell
/// has a monotonically descending path to the grid boundary or to no-data.
/// Filled cells are raised by at least `--epsilon` above the cell they drain
/// to; an epsilon of zero leaves flat surfaces over filled depressions.
///
/// Two methods are available. `priority_flood` (default) floods the DEM inward
/// from its boundary in a single pass (Barnes et al., 2014). `planchon_darboux`
/// iteratively lowers an initial water surface (Planchon and Darboux, 2001) and
/// stops after `--max_iterations` passes if it has not converged.
///
/// Unset `--epsilon` and `--max_iterations` values come from settings.json.
///
/// # References
/// Barnes, R., Lehman, C., & Mulla, D. (2014). Priority-flood: An optimal
/// depression-filling and watershed-labeling algorithm for digital elevation
/// models. Computers & Geosciences, 62, 117-127.
///
/// Planchon, O., & Darboux, F. (2001). A fast, simple and versatile algorithm to
/// fill the depressions of digital elevation models. Catena, 46(2-3), 159-176.
///
/// # See Also
/// `D8Pointer`
pub struct FillPits {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl FillPits {
    pub fn new() -> FillPits {
        // public constructor
        let name = "FillPits".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description = "Fills depressions in a DEM so every cell drains to the grid edge."
            .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input DEM File".to_owned(),
            flags: vec!["-i".to_owned(), "--dem".to_owned()],
            description: "Input raster DEM file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Fill Method".to_owned(),
            flags: vec!["--method".to_owned()],
            description: "Filling method; options are 'priority_flood' and 'planchon_darboux'."
                .to_owned(),
            parameter_type: ParameterType::OptionList(vec![
                "priority_flood".to_owned(),
                "planchon_darboux".to_owned(),
            ]),
            default_value: Some("priority_flood".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Minimum Drop (epsilon)".to_owned(),
            flags: vec!["--epsilon".to_owned()],
            description: "Minimum elevation increment between a filled cell and its outflow cell."
                .to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.000001".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Maximum Iterations".to_owned(),
            flags: vec!["--max_iterations".to_owned()],
            description: "Upper bound on Planchon-Darboux passes.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("10000".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "--dem=DEM.asc -o=filled.asc --epsilon=0.001");

        FillPits {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for FillPits {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_to_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(&self, args: Vec<String>, working_directory: &'a str, verbose: bool) -> Result<()> {
        let args = ToolArgs::parse(&args)?;
        let input_file = resolve_path(&args.require(&["-i", "--dem", "--input"])?, working_directory);
        let output_file = resolve_path(&args.require(&["-o", "--output"])?, working_directory);

        let configs = configs::get_configs()?;
        let method = match args.get(&["--method"]) {
            Some(name) => PitFillMethod::from_name(&name).ok_or_else(|| {
                HydroError::Configuration(format!("Unrecognized fill method '{}'.", name))
            })?,
            None => PitFillMethod::default(),
        };
        let params = PitFillParams {
            method,
            epsilon: args
                .get_f64(&["--epsilon"])?
                .unwrap_or(configs.pit_fill_epsilon),
            max_iterations: args
                .get_usize(&["--max_iterations"])?
                .unwrap_or(configs.pit_fill_max_iterations),
        };

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let dem = read_grid(&input_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let report = match completed(fill_pits(&dem, &params, &mut runner)?, verbose) {
            Some(report) => report,
            None => return Ok(()),
        };
        let elapsed_time = get_formatted_elapsed_time(start);

        if verbose {
            println!(
                "Raised {} cells in {} pass(es).",
                report.cells_raised, report.iterations
            );
            if !report.converged {
                println!(
                    "Warning: filling stopped after {} iterations without converging.",
                    report.iterations
                );
            }
        }
        write_grid(&report.filled, &output_file, verbose)?;
        if verbose {
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }
        Ok(())
    }
}
