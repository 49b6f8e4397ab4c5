/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::hypsographic_curve;
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

/// This tool derives the hypsographic (area-elevation) curve of a DEM
/// (`--dem`): for `--bins` equally spaced elevations between the DEM minimum
/// and maximum, the map area lying at or above that elevation and its share of
/// the total. The curve is written as CSV (`--output`) with the columns
/// `elevation,area,fraction`. The hypsometric integral is reported in verbose
/// mode.
///
/// # See Also
/// `FillPits`
pub struct HypsographicCurve {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl HypsographicCurve {
    pub fn new() -> HypsographicCurve {
        // public constructor
        let name = "HypsographicCurve".to_string();
        let toolbox = "Geomorphometric Analysis".to_string();
        let description = "Calculates the area-elevation curve of a DEM.".to_string();

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
            name: "Output CSV File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output CSV file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Csv),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Number of Bins".to_owned(),
            flags: vec!["--bins".to_owned()],
            description: "Number of elevation levels on the curve.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("20".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "--dem=DEM.asc -o=curve.csv --bins=50");

        HypsographicCurve {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for HypsographicCurve {
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
        let num_bins = args.get_usize(&["--bins"])?.unwrap_or(20);

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let dem = read_grid(&input_file)?;

        let start = Instant::now();
        let curve = hypsographic_curve(&dem, num_bins)?;
        let elapsed_time = get_formatted_elapsed_time(start);

        if verbose {
            println!("Saving data...")
        };
        let f = File::create(&output_file)?;
        let mut writer = BufWriter::new(f);
        writer.write_all(curve.to_csv().as_bytes())?;
        writer.flush()?;

        if verbose {
            println!("Output file written");
            println!("Elevation range: {} to {}", curve.min, curve.max);
            match curve.integral {
                Some(hi) => println!("Hypsometric integral: {:.4}", hi),
                None => println!("Hypsometric integral: undefined (flat DEM)"),
            }
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }
        Ok(())
    }
}
