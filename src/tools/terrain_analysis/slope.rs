/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::{slope, NumericGuard};
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool calculates the slope along the D8 flow path: the elevation drop
/// from each cell (`--dem`) to the neighbour its flow direction (`--d8_pntr`)
/// points at, divided by the distance between the two cell centres. Outlets,
/// pits and directions leading off the grid give NoData. Use `--strict` to fail
/// on undefined arithmetic instead of writing NoData.
///
/// # See Also
/// `D8Pointer`, `TopIndex`, `Gradient`
pub struct Slope {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl Slope {
    pub fn new() -> Slope {
        // public constructor
        let name = "Slope".to_string();
        let toolbox = "Geomorphometric Analysis".to_string();
        let description = "Calculates the slope along D8 flow directions.".to_string();

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
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["--d8_pntr".to_owned()],
            description: "Input D8 flow-direction raster file.".to_owned(),
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
            name: "Fail on invalid arithmetic?".to_owned(),
            flags: vec!["--strict".to_owned()],
            description: "Abort on undefined arithmetic rather than writing NoData.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "--dem=DEM.asc --d8_pntr=flow.asc -o=slope.asc");

        Slope {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for Slope {
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
        let dem_file = resolve_path(&args.require(&["-i", "--dem"])?, working_directory);
        let flow_file = resolve_path(&args.require(&["--d8_pntr", "--flow"])?, working_directory);
        let output_file = resolve_path(&args.require(&["-o", "--output"])?, working_directory);
        let guard = if args.get_flag(&["--strict"]) {
            NumericGuard::Fail
        } else {
            NumericGuard::Substitute
        };

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let dem = read_grid(&dem_file)?;
        let flow = read_grid(&flow_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let output = match completed(slope(&dem, &flow, guard, &mut runner)?, verbose) {
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
    fn test_slope_tool_whitebox_format() {
        let wd = scratch_dir("slope");
        let dem = Grid::from_rows(&[vec![5.0, 3.0, 2.0]], -9999.0).unwrap();
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 10.0]], -9999.0).unwrap();
        write_grid(&dem, &format!("{}dem.dep", wd), false).unwrap();
        write_grid(&flow, &format!("{}flow.dep", wd), false).unwrap();

        Slope::new()
            .run(
                vec![
                    "--dem=dem.dep".to_string(),
                    "--d8_pntr=flow.dep".to_string(),
                    "-o=slope.dep".to_string(),
                ],
                &wd,
                false,
            )
            .unwrap();
        let out = read_grid(&format!("{}slope.dep", wd)).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 2.0);
        assert_eq!(out.get(0, 1).unwrap(), 1.0);
        assert!(out.is_nodata(out.get(0, 2).unwrap()));
    }
}
