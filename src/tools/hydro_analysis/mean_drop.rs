/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::{mean_drop, NumericGuard};
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool estimates, for every cell, the mean elevation drop from the cells
/// draining into it down to the cell itself:
///
/// > mean drop = sum(upstream elevations) / contributing cells - elevation
///
/// The flow directions (`--d8_pntr`) and elevations (`--dem`) are required. An
/// optional contributing-area grid (`--tca`) is used as the divisor when given;
/// otherwise only contributing cells with a valid elevation are counted. With
/// `--strict` the tool fails on a cell with a non-positive divisor instead of
/// writing no-data there.
///
/// # See Also
/// `TotalContributingArea`, `SumDownstream`
pub struct MeanDrop {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl MeanDrop {
    pub fn new() -> MeanDrop {
        // public constructor
        let name = "MeanDrop".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Calculates the mean elevation drop from upstream cells to each cell.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["--d8_pntr".to_owned()],
            description: "Input D8 flow-direction raster file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input DEM File".to_owned(),
            flags: vec!["-i".to_owned(), "--dem".to_owned()],
            description: "Input raster DEM file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input Contributing Area File".to_owned(),
            flags: vec!["--tca".to_owned()],
            description: "Optional contributing-area raster used as the divisor.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: true,
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

        let usage = example_usage(&name, "--d8_pntr=flow.asc --dem=DEM.asc -o=mean_drop.asc");

        MeanDrop {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for MeanDrop {
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
        let flow_file = resolve_path(&args.require(&["--d8_pntr", "--flow"])?, working_directory);
        let dem_file = resolve_path(&args.require(&["-i", "--dem"])?, working_directory);
        let tca_file = args.get(&["--tca"]).map(|f| resolve_path(&f, working_directory));
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
        let flow = read_grid(&flow_file)?;
        let dem = read_grid(&dem_file)?;
        let tca = match tca_file {
            Some(f) => Some(read_grid(&f)?),
            None => None,
        };

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let outcome = mean_drop(&flow, &dem, tca.as_ref(), guard, &mut runner)?;
        let output = match completed(outcome, verbose) {
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
    fn test_mean_drop_tool() {
        let wd = scratch_dir("mean_drop");
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 10.0]], -9999.0).unwrap();
        let dem = Grid::from_rows(&[vec![3.0, 2.0, 1.0]], -9999.0).unwrap();
        write_grid(&flow, &format!("{}flow.asc", wd), false).unwrap();
        write_grid(&dem, &format!("{}dem.asc", wd), false).unwrap();

        MeanDrop::new()
            .run(
                vec![
                    "--d8_pntr=flow.asc".to_string(),
                    "--dem=dem.asc".to_string(),
                    "-o=drop.asc".to_string(),
                ],
                &wd,
                false,
            )
            .unwrap();
        let drop = read_grid(&format!("{}drop.asc", wd)).unwrap();
        assert_eq!(drop.values(), &[0.0, 0.5, 1.0]);
    }
}
