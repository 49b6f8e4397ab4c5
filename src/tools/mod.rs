/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

pub mod hydro_analysis;
pub mod terrain_analysis;

use crate::configs;
use crate::error::{HydroError, Result};
use crate::raster::{FileGridStore, Grid, GridSink, GridSource};
use crate::utils::{ConsoleProgress, Outcome, TiledRunner};
use serde::{Deserialize, Serialize};
use std::env;
use std::path;

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(working_directory: &'a str, verbose_mode: &'a bool) -> Result<ToolManager> {
        let mut tool_names = vec![];
        // hydro_analysis
        tool_names.push("D8Pointer".to_string());
        tool_names.push("FillPits".to_string());
        tool_names.push("MeanDrop".to_string());
        tool_names.push("SumDownstream".to_string());
        tool_names.push("TopIndex".to_string());
        tool_names.push("TotalContributingArea".to_string());

        // terrain_analysis
        tool_names.push("Gradient".to_string());
        tool_names.push("HypsographicCurve".to_string());
        tool_names.push("Nabla".to_string());
        tool_names.push("Slope".to_string());

        let tm = ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn HydroTool>> {
        match tool_name.to_lowercase().replace("_", "").as_str() {
            // hydro_analysis
            "d8pointer" => Some(Box::new(hydro_analysis::D8Pointer::new())),
            "fillpits" => Some(Box::new(hydro_analysis::FillPits::new())),
            "meandrop" => Some(Box::new(hydro_analysis::MeanDrop::new())),
            "sumdownstream" => Some(Box::new(hydro_analysis::SumDownstream::new())),
            "topindex" => Some(Box::new(hydro_analysis::TopIndex::new())),
            "totalcontributingarea" => {
                Some(Box::new(hydro_analysis::TotalContributingArea::new()))
            }

            // terrain_analysis
            "gradient" => Some(Box::new(terrain_analysis::Gradient::new())),
            "hypsographiccurve" => Some(Box::new(terrain_analysis::HypsographicCurve::new())),
            "nabla" => Some(Box::new(terrain_analysis::Nabla::new())),
            "slope" => Some(Box::new(terrain_analysis::Slope::new())),

            _ => None,
        }
    }

    fn unrecognized(tool_name: &str) -> HydroError {
        HydroError::Configuration(format!("Unrecognized tool name {}.", tool_name))
    }

    /// Runs a tool. Failures are tagged with the tool name.
    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<()> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool
                .run(args, &self.working_dir, self.verbose)
                .map_err(|e| e.in_stage(&tool.get_tool_name())),
            None => Err(ToolManager::unrecognized(&tool_name)),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<()> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", get_help(tool)),
                None => return Err(ToolManager::unrecognized(&tool_name)),
            }
        } else {
            let mut i = 1;
            for val in &self.tool_names {
                if let Some(tool) = self.get_tool(val) {
                    println!("{}. {}\n", i, get_help(tool));
                    i += 1;
                }
            }
        }
        Ok(())
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<()> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => println!("{}", tool.get_tool_parameters()),
            None => return Err(ToolManager::unrecognized(&tool_name)),
        }
        Ok(())
    }

    pub fn toolbox(&self, tool_name: String) -> Result<()> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", tool.get_toolbox()),
                None => return Err(ToolManager::unrecognized(&tool_name)),
            }
        } else {
            for val in &self.tool_names {
                if let Some(tool) = self.get_tool(val) {
                    println!("{}: {}\n", val, tool.get_toolbox());
                }
            }
        }
        Ok(())
    }

    pub fn list_tools(&self) {
        let tool_details: Vec<(String, String)> = self
            .tool_names
            .iter()
            .filter_map(|val| self.get_tool(val))
            .map(get_name_and_description)
            .collect();

        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            if let Some(tool) = self.get_tool(val) {
                let toolbox = tool.get_toolbox().to_lowercase();
                let (nm, des) = get_name_and_description(tool);
                let matched = keywords.iter().any(|kw| {
                    let kw = kw.to_lowercase();
                    nm.to_lowercase().contains(&kw)
                        || des.to_lowercase().contains(&kw)
                        || toolbox.contains(&kw)
                });
                if matched {
                    tool_details.push((nm, des));
                }
            }
        }

        let mut ret = format!("All {} Tools containing keywords:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn get_tool_source_code(&self, tool_name: String) -> Result<()> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => println!("{}", tool.get_source_file()),
            None => return Err(ToolManager::unrecognized(&tool_name)),
        }
        Ok(())
    }
}

pub trait HydroTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn get_source_file(&self) -> String;
    fn run<'a>(&self, args: Vec<String>, working_directory: &'a str, verbose: bool) -> Result<()>;
}

fn get_help<'a>(wt: Box<dyn HydroTool + 'a>) -> String {
    let tool_name = wt.get_tool_name();
    let description = wt.get_tool_description();
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters).unwrap_or(serde_json::Value::Null);
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    if let Some(a) = o["parameters"].as_array() {
        for d in a {
            let mut s = String::new();
            for f in d["flags"].as_array().into_iter().flatten() {
                s.push_str(&format!("{}, ", f.as_str().unwrap_or("")));
            }
            p.push_str(&format!(
                "{:width$} {}\n",
                s.trim().trim_matches(','),
                d["description"].as_str().unwrap_or(""),
                width = 18
            ));
        }
    }
    let example = wt.get_example_usage();
    if example.len() <= 1 {
        format!(
            "{}\n\nDescription:\n{}\nToolbox: {}\nParameters:\n\n{}\n",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}\nDescription:\n{}\nToolbox: {}\nParameters:\n\n{}\n\nExample usage:\n{}\n",
            tool_name, description, toolbox, p, example
        )
    }
}

fn get_name_and_description<'a>(wt: Box<dyn HydroTool + 'a>) -> (String, String) {
    (wt.get_tool_name(), wt.get_tool_description())
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ToolParameter {
    pub name: String,
    pub flags: Vec<String>,
    pub description: String,
    pub parameter_type: ParameterType,
    pub default_value: Option<String>,
    pub optional: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum ParameterType {
    Boolean,
    String,
    Integer,
    Float,
    ExistingFile(ParameterFileType),
    NewFile(ParameterFileType),
    OptionList(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug)]
pub enum ParameterFileType {
    Any,
    Raster,
    Csv,
}

/// Serialises a tool's parameters in the `{"parameters": [...]}` form that
/// `--toolhelp` and front ends read.
pub(crate) fn parameters_to_json(parameters: &[ToolParameter]) -> String {
    match serde_json::to_string(parameters) {
        Ok(json_str) => format!("{{\"parameters\":{}}}", json_str),
        Err(err) => format!("{:?}", err),
    }
}

/// A `>>./hydro_tools -r=Tool ...` usage line for the help output.
pub(crate) fn example_usage(tool_name: &str, args: &str) -> String {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let exe = env::current_exe().ok();
    let e = exe
        .as_ref()
        .map(|p| format!("{}", p.display()))
        .unwrap_or_default();
    let parent = exe
        .as_ref()
        .and_then(|p| p.parent())
        .map(|p| format!("{}", p.display()))
        .unwrap_or_default();
    let mut short_exe = e
        .replace(&parent, "")
        .replace(".exe", "")
        .replace(".", "")
        .replace(&sep, "");
    if e.contains(".exe") {
        short_exe += ".exe";
    }
    if short_exe.is_empty() {
        short_exe = "hydro_tools".to_string();
    }
    format!(
        ">>.*{} -r={} -v --wd=\"*path*to*data*\" {}",
        short_exe, tool_name, args
    )
    .replace("*", &sep)
}

/// Tool arguments given as `-flag=value`, `-flag value` or a bare `-flag`.
#[derive(Debug, Default)]
pub(crate) struct ToolArgs {
    values: Vec<(String, Option<String>)>,
}

impl ToolArgs {
    pub fn parse(args: &[String]) -> Result<ToolArgs> {
        if args.is_empty() {
            return Err(HydroError::Configuration(
                "Tool run with no parameters.".to_string(),
            ));
        }
        let mut values = vec![];
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].replace("\"", "").replace("\'", "");
            if let Some((flag, value)) = arg.split_once('=') {
                values.push((flag.trim().to_lowercase(), Some(value.trim().to_string())));
            } else if arg.starts_with('-') && arg.parse::<f64>().is_err() {
                let next = args.get(i + 1).map(|a| a.replace("\"", "").replace("\'", ""));
                match next {
                    Some(v) if !v.starts_with('-') || v.parse::<f64>().is_ok() => {
                        values.push((arg.trim().to_lowercase(), Some(v.trim().to_string())));
                        i += 1;
                    }
                    _ => values.push((arg.trim().to_lowercase(), None)),
                }
            }
            i += 1;
        }
        Ok(ToolArgs { values })
    }

    fn find(&self, flags: &[&str]) -> Option<&Option<String>> {
        self.values.iter().rev().find_map(|(flag, value)| {
            let bare = flag.trim_start_matches('-');
            if flags.iter().any(|f| f.trim_start_matches('-') == bare) {
                Some(value)
            } else {
                None
            }
        })
    }

    pub fn get(&self, flags: &[&str]) -> Option<String> {
        self.find(flags).and_then(|v| v.clone())
    }

    pub fn require(&self, flags: &[&str]) -> Result<String> {
        match self.get(flags) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(HydroError::Configuration(format!(
                "Missing required parameter {}.",
                flags.join("/")
            ))),
        }
    }

    /// True if the flag is present, unless its value contains "false".
    pub fn get_flag(&self, flags: &[&str]) -> bool {
        match self.find(flags) {
            Some(Some(v)) => !v.to_lowercase().contains("false"),
            Some(None) => true,
            None => false,
        }
    }

    pub fn get_f64(&self, flags: &[&str]) -> Result<Option<f64>> {
        match self.get(flags) {
            Some(v) => v.parse::<f64>().map(Some).map_err(|_| {
                HydroError::Configuration(format!(
                    "Error parsing {} value '{}' as a number.",
                    flags.join("/"),
                    v
                ))
            }),
            None => Ok(None),
        }
    }

    pub fn get_usize(&self, flags: &[&str]) -> Result<Option<usize>> {
        match self.get(flags) {
            Some(v) => v.parse::<usize>().map(Some).map_err(|_| {
                HydroError::Configuration(format!(
                    "Error parsing {} value '{}' as a whole number.",
                    flags.join("/"),
                    v
                ))
            }),
            None => Ok(None),
        }
    }
}

pub(crate) fn print_welcome(tool_name: &str) {
    let welcome_len = format!("* Welcome to {} *", tool_name).len().max(25);
    println!("{}", "*".repeat(welcome_len));
    println!(
        "* Welcome to {} {}*",
        tool_name,
        " ".repeat(welcome_len - 15 - tool_name.len())
    );
    println!("* Powered by HydroTools {}*", " ".repeat(welcome_len - 25));
    println!("{}", "*".repeat(welcome_len));
}

/// Prefixes bare file names with the working directory.
pub(crate) fn resolve_path(file_name: &str, working_directory: &str) -> String {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    if !file_name.contains(&sep) && !file_name.contains('/') {
        format!("{}{}", working_directory, file_name)
    } else {
        file_name.to_string()
    }
}

/// A runner with the tile scheme from settings.json and console progress.
pub(crate) fn console_runner(verbose: bool) -> Result<TiledRunner<'static>> {
    let configs = configs::get_configs()?;
    Ok(TiledRunner::new(
        configs.tile_scheme(),
        Box::new(ConsoleProgress::new(verbose)),
    ))
}

pub(crate) fn read_grid(file_name: &str) -> Result<Grid> {
    FileGridStore.load_grid(file_name)
}

pub(crate) fn write_grid(grid: &Grid, file_name: &str, verbose: bool) -> Result<()> {
    if verbose {
        println!("Saving data...")
    };
    FileGridStore.store_grid(grid, file_name)?;
    if verbose {
        println!("Output file written")
    }
    Ok(())
}

/// Unwraps a pass outcome; `None` means the run was cancelled and nothing
/// should be written.
pub(crate) fn completed<T>(outcome: Outcome<T>, verbose: bool) -> Option<T> {
    match outcome {
        Outcome::Completed(v) => Some(v),
        Outcome::Cancelled(_) => {
            if verbose {
                println!("Operation cancelled; no output written.");
            }
            None
        }
    }
}
