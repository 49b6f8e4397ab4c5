/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::{top_index, NumericGuard, TopIndexParams};
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool calculates the topographic wetness index, `ln(As / tan(slope))`,
/// from an accumulation grid (`--accum`) and a slope grid (`--slope`), for
/// example the outputs of `TotalContributingArea` and `Slope`. Flat cells and
/// cells with a non-positive ratio have no defined index; they are written as
/// NoData unless `--strict` is given, in which case the tool fails.
///
/// # Reference
/// Beven, K. J., & Kirkby, M. J. (1979). A physically based, variable
/// contributing area model of basin hydrology. Hydrological Sciences Bulletin,
/// 24(1), 43-69.
///
/// # See Also
/// `Slope`, `TotalContributingArea`
pub struct TopIndex {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl TopIndex {
    pub fn new() -> TopIndex {
        // public constructor
        let name = "TopIndex".to_string();
        let toolbox = "Hydrological Analysis".to_string();
        let description = "Calculates the topographic wetness index, ln(As / slope).".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Accumulation File".to_owned(),
            flags: vec!["--accum".to_owned(), "--sca".to_owned()],
            description: "Input contributing-area raster file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input Slope File".to_owned(),
            flags: vec!["--slope".to_owned()],
            description: "Input slope raster file.".to_owned(),
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

        let usage = example_usage(&name, "--accum=tca.asc --slope=slope.asc -o=twi.asc");

        TopIndex {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for TopIndex {
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
        let accum_file = resolve_path(&args.require(&["--accum", "--sca"])?, working_directory);
        let slope_file = resolve_path(&args.require(&["--slope"])?, working_directory);
        let output_file = resolve_path(&args.require(&["-o", "--output"])?, working_directory);
        let params = TopIndexParams {
            guard: if args.get_flag(&["--strict"]) {
                NumericGuard::Fail
            } else {
                NumericGuard::Substitute
            },
        };

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let accumulation = read_grid(&accum_file)?;
        let slope = read_grid(&slope_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let output = match completed(top_index(&accumulation, &slope, &params, &mut runner)?, verbose) {
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
