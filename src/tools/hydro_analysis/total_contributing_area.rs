/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::total_contributing_area;
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool counts, for each cell of a D8 flow-direction grid (`--d8_pntr`),
/// the number of cells draining through it, itself included. Multiply by the
/// cell area to obtain upslope area. With `--area` the output is reported in
/// map units squared rather than cell counts.
///
/// # See Also
/// `D8Pointer`, `SumDownstream`, `MeanDrop`
pub struct TotalContributingArea {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl TotalContributingArea {
    pub fn new() -> TotalContributingArea {
        // public constructor
        let name = "TotalContributingArea".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Counts the cells draining through each cell of a D8 flow-direction raster."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["-i".to_owned(), "--d8_pntr".to_owned()],
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
            name: "Report as area?".to_owned(),
            flags: vec!["--area".to_owned()],
            description: "Multiply cell counts by the cell area.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "--d8_pntr=flow.asc -o=tca.asc");

        TotalContributingArea {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for TotalContributingArea {
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
        let flow_file = resolve_path(&args.require(&["-i", "--d8_pntr", "--flow"])?, working_directory);
        let output_file = resolve_path(&args.require(&["-o", "--output"])?, working_directory);
        let as_area = args.get_flag(&["--area"]);

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let flow = read_grid(&flow_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let mut output = match completed(total_contributing_area(&flow, &mut runner)?, verbose) {
            Some(output) => output,
            None => return Ok(()),
        };
        if as_area {
            let cell_area = flow.region().resolution_x * flow.region().resolution_y;
            let rows = output.rows();
            for row in 0..rows {
                let data: Vec<f64> = output
                    .get_row_data(row)
                    .iter()
                    .map(|v| if output.is_nodata(*v) { *v } else { *v * cell_area })
                    .collect();
                output.set_row_data(row, data)?;
            }
        }
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
    use crate::raster::{Grid, Region};
    use crate::tools::test_support::scratch_dir;

    #[test]
    fn test_contributing_area_counts_and_areas() {
        let wd = scratch_dir("tca");
        let region = Region::from_resolution(0.0, 0.0, 2.0, 2.0, 1, 3).unwrap();
        let flow = Grid::from_data(region, -9999.0, vec![1.0, 1.0, 10.0]).unwrap();
        write_grid(&flow, &format!("{}flow.asc", wd), false).unwrap();
        let tool = TotalContributingArea::new();

        tool.run(
            vec!["--d8_pntr=flow.asc".to_string(), "-o=tca.asc".to_string()],
            &wd,
            false,
        )
        .unwrap();
        let tca = read_grid(&format!("{}tca.asc", wd)).unwrap();
        assert_eq!(tca.values(), &[1.0, 2.0, 3.0]);

        tool.run(
            vec![
                "--d8_pntr=flow.asc".to_string(),
                "-o=area.asc".to_string(),
                "--area".to_string(),
            ],
            &wd,
            false,
        )
        .unwrap();
        let area = read_grid(&format!("{}area.asc", wd)).unwrap();
        assert_eq!(area.values(), &[4.0, 8.0, 12.0]);
    }
}
