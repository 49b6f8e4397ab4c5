/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::d8_flow_directions;
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool generates a D8 flow-direction grid from a DEM (`--dem`). Every valid
/// cell points at the neighbour offering the steepest drop per unit distance,
/// using the codes
///
/// | .  | .  | .  |
/// |:--:|:--:|:--:|
/// | 4  | 3  | 2  |
/// | 5  | .  | 1  |
/// | 6  | 7  | 8  |
///
/// Cells without a lower neighbour are coded 10 when they lie on the grid edge or
/// beside no-data (outlets), and 0 in the interior. Interior zeros mark pits that
/// should be removed with `FillPits` before accumulating flow.
///
/// # See Also
/// `FillPits`, `TotalContributingArea`, `SumDownstream`
pub struct D8Pointer {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl D8Pointer {
    pub fn new() -> D8Pointer {
        // public constructor
        let name = "D8Pointer".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description = "Calculates a D8 flow-direction raster from an input DEM.".to_string();

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
            description: "Output flow-direction raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        let usage = example_usage(&name, "--dem=DEM.asc -o=flow.asc");

        D8Pointer {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for D8Pointer {
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

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let dem = read_grid(&input_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let output = match completed(d8_flow_directions(&dem, &mut runner)?, verbose) {
            Some(output) => output,
            None => return Ok(()),
        };
        let elapsed_time = get_formatted_elapsed_time(start);

        if verbose && output.interior_pits > 0 {
            println!(
                "Warning: {} interior cells have no downslope neighbour; consider filling pits first.",
                output.interior_pits
            );
        }
        write_grid(&output.directions, &output_file, verbose)?;
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
    fn test_d8_pointer_tool_writes_codes() {
        let wd = scratch_dir("d8_pointer");
        let dem = Grid::from_rows(&[vec![3.0, 2.0, 1.0]], -9999.0).unwrap();
        write_grid(&dem, &format!("{}dem.asc", wd), false).unwrap();

        let tool = D8Pointer::new();
        tool.run(
            vec!["--dem=dem.asc".to_string(), "-o=flow.asc".to_string()],
            &wd,
            false,
        )
        .unwrap();
        let flow = read_grid(&format!("{}flow.asc", wd)).unwrap();
        assert_eq!(flow.values(), &[1.0, 1.0, 10.0]);
    }

    #[test]
    fn test_missing_output_is_configuration_error() {
        let tool = D8Pointer::new();
        let err = tool
            .run(vec!["--dem=dem.asc".to_string()], "", false)
            .unwrap_err();
        assert!(matches!(err, crate::error::HydroError::Configuration(_)));
    }
}
