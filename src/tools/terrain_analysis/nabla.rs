/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use crate::algorithms::{nabla, NablaMode, NablaParams};
use crate::error::Result;
use crate::tools::*;
use crate::utils::get_formatted_elapsed_time;
use std::time::Instant;

/// This tool calculates the discrete Laplacian of a DEM (`--dem`) with the
/// five-point stencil. Positive values mark concave (hollow) cells and negative
/// values convex (ridge) cells. With `--classify` the output holds classes
/// instead: 1 where the Laplacian exceeds `--threshold`, -1 where it is below
/// its negative, and 0 otherwise. A threshold is required when classifying.
///
/// # See Also
/// `Gradient`
pub struct Nabla {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl Nabla {
    pub fn new() -> Nabla {
        // public constructor
        let name = "Nabla".to_string();
        let toolbox = "Geomorphometric Analysis".to_string();
        let description =
            "Calculates the Laplacian of a DEM, optionally classified by curvature sign."
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
            name: "Classify output?".to_owned(),
            flags: vec!["--classify".to_owned()],
            description: "Output concave (1), planar (0) and convex (-1) classes.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Planar Threshold".to_owned(),
            flags: vec!["--threshold".to_owned()],
            description: "Laplacian magnitude below which a cell is planar.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: true,
        });

        let usage = example_usage(&name, "--dem=DEM.asc -o=nabla.asc --classify --threshold=0.01");

        Nabla {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl HydroTool for Nabla {
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
        let params = NablaParams {
            mode: if args.get_flag(&["--classify"]) {
                NablaMode::Classify
            } else {
                NablaMode::Laplacian
            },
            threshold: args.get_f64(&["--threshold"])?,
        };

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let dem = read_grid(&input_file)?;

        let start = Instant::now();
        let mut runner = console_runner(verbose)?;
        let output = match completed(nabla(&dem, &params, &mut runner)?, verbose) {
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
    fn test_nabla_tool_classifies() {
        let wd = scratch_dir("nabla");
        let dem = Grid::from_rows(
            &[
                vec![5.0, 4.0, 5.0],
                vec![4.0, 1.0, 4.0],
                vec![5.0, 4.0, 5.0],
            ],
            -9999.0,
        )
        .unwrap();
        write_grid(&dem, &format!("{}dem.asc", wd), false).unwrap();
        let tool = Nabla::new();

        tool.run(
            vec!["--dem=dem.asc".to_string(), "-o=lap.asc".to_string()],
            &wd,
            false,
        )
        .unwrap();
        assert_eq!(read_grid(&format!("{}lap.asc", wd)).unwrap().get(1, 1).unwrap(), 12.0);

        tool.run(
            vec![
                "--dem=dem.asc".to_string(),
                "-o=class.asc".to_string(),
                "--classify".to_string(),
                "--threshold=0.5".to_string(),
            ],
            &wd,
            false,
        )
        .unwrap();
        assert_eq!(read_grid(&format!("{}class.asc", wd)).unwrap().get(1, 1).unwrap(), 1.0);

        let err = tool
            .run(
                vec![
                    "--dem=dem.asc".to_string(),
                    "-o=class.asc".to_string(),
                    "--classify".to_string(),
                ],
                &wd,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, HydroError::Configuration(_)));
    }
}
