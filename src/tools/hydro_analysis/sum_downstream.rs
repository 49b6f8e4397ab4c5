/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::sum_downstream;
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool accumulates a source grid (`--input`) along a D8 flow-direction
/// grid (`--d8_pntr`), so that each output cell holds the sum of the source
/// values of itself and every cell upstream of it. No-data source cells add
/// nothing. A flow grid containing a cycle is rejected.
///
/// # See Also
/// `D8Pointer`, `TotalContributingArea`
pub struct SumDownstream {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl SumDownstream {
    pub fn new() -> SumDownstream {
        // public constructor
        let name = "SumDownstream".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description =
            "Accumulates a source raster along D8 flow directions.".to_string();

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
            name: "Input Source File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input raster of values to accumulate.".to_owned(),
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

        let usage = example_usage(&name, "--d8_pntr=flow.asc -i=rainfall.asc -o=output.asc");

        SumDownstream {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for SumDownstream {
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
        let source_file = resolve_path(&args.require(&["-i", "--input"])?, working_directory);
        let output_file = resolve_path(&args.require(&["-o", "--output"])?, working_directory);

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let flow = read_grid(&flow_file)?;
        let source = read_grid(&source_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let output = match completed(sum_downstream(&flow, &source, &mut runner)?, verbose) {
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
    use crate::error::HydroError;
    use crate::raster::Grid;
    use crate::tools::test_support::scratch_dir;

    #[test]
    fn test_sum_downstream_tool() {
        let wd = scratch_dir("sum_downstream");
        let flow = Grid::from_rows(&[vec![1.0, 1.0, 1.0, 10.0]], -9999.0).unwrap();
        let source = Grid::from_rows(&[vec![1.0, 2.0, 3.0, 4.0]], -9999.0).unwrap();
        write_grid(&flow, &format!("{}flow.asc", wd), false).unwrap();
        write_grid(&source, &format!("{}source.asc", wd), false).unwrap();

        SumDownstream::new()
            .run(
                vec![
                    "--d8_pntr=flow.asc".to_string(),
                    "-i".to_string(),
                    "source.asc".to_string(),
                    "-o=sum.asc".to_string(),
                ],
                &wd,
                false,
            )
            .unwrap();
        let sum = read_grid(&format!("{}sum.asc", wd)).unwrap();
        assert_eq!(sum.values(), &[1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn test_cycle_is_reported_through_tool_manager() {
        let wd = scratch_dir("sum_downstream_cycle");
        let flow = Grid::from_rows(&[vec![1.0, 5.0]], -9999.0).unwrap();
        write_grid(&flow, &format!("{}flow.asc", wd), false).unwrap();
        write_grid(&flow, &format!("{}source.asc", wd), false).unwrap();

        let tm = ToolManager::new(&wd, &false).unwrap();
        let err = tm
            .run_tool(
                "SumDownstream".to_string(),
                vec![
                    "--d8_pntr=flow.asc".to_string(),
                    "--input=source.asc".to_string(),
                    "-o=sum.asc".to_string(),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, HydroError::Stage { .. }));
        assert!(matches!(err.root_cause(), HydroError::FlowGraphCycle { .. }));
    }
}
