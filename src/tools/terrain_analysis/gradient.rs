/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::{gradient, GradientMode, GradientParams};
use crate::error::{HydroError, Result};
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool calculates the magnitude of the surface gradient of a DEM
/// (`--dem`), as rise over run. Three derivative schemes are offered through
/// `--mode`: central finite differences (`finite`, the default), the Horn
/// (1981) weighted 3x3 stencil (`horn`), and the Evans (1980) unweighted 3x3
/// stencil (`evans`). Edge cells and cells whose stencil reaches NoData are
/// written as NoData.
///
/// # See Also
/// `Slope`, `Nabla`
pub struct Gradient {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl Gradient {
    pub fn new() -> Gradient {
        // public constructor
        let name = "Gradient".to_string();
        let toolbox = "Geomorphometric Analysis".to_string();
        let description = "Calculates the gradient magnitude of a DEM.".to_string();

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
            name: "Derivative Scheme".to_owned(),
            flags: vec!["--mode".to_owned()],
            description: "Derivative scheme; options are 'finite', 'horn' and 'evans'."
                .to_owned(),
            parameter_type: ParameterType::OptionList(vec![
                "finite".to_owned(),
                "horn".to_owned(),
                "evans".to_owned(),
            ]),
            default_value: Some("finite".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "--dem=DEM.asc -o=gradient.asc --mode=horn");

        Gradient {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for Gradient {
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
        let mode = match args.get(&["--mode"]) {
            Some(name) => GradientMode::from_name(&name).ok_or_else(|| {
                HydroError::Configuration(format!("Unrecognized gradient mode '{}'.", name))
            })?,
            None => GradientMode::default(),
        };

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let dem = read_grid(&input_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let output = match completed(gradient(&dem, &GradientParams { mode }, &mut runner)?, verbose) {
            Some(output) => output,
            None => return Ok(()),
        };
        let elapsed_time = get_formatted_elapsed_time(start);

        write_grid(&output, &output_file, verbose)?;
        if verbose {
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Grid;
    use crate::tools::test_support::scratch_dir;

    #[test]
    fn test_gradient_tool_modes() {
        let wd = scratch_dir("gradient");
        let dem = Grid::from_rows(
            &[
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
                vec![1.0, 2.0, 3.0],
            ],
            -9999.0,
        )
        .unwrap();
        write_grid(&dem, &format!("{}dem.asc", wd), false).unwrap();
        let tool = Gradient::new();
        for mode in ["finite", "horn", "evans"] {
            tool.run(
                vec![
                    "--dem=dem.asc".to_string(),
                    "-o=grad.asc".to_string(),
                    format!("--mode={}", mode),
                ],
                &wd,
                false,
            )
            .unwrap();
            let grad = read_grid(&format!("{}grad.asc", wd)).unwrap();
            assert!((grad.get(1, 1).unwrap() - 1.0).abs() < 1e-9);
        }

        let err = tool
            .run(
                vec![
                    "--dem=dem.asc".to_string(),
                    "-o=grad.asc".to_string(),
                    "--mode=sobel".to_string(),
                ],
                &wd,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, HydroError::Configuration(_)));
    }
}
