/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use hydro_tools::error::Result;
use hydro_tools::tools::ToolManager;
use std::env;
use std::path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            tracing::error!(%err, "tool run failed");
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default level, which is `info`
/// in verbose mode and `warn` otherwise.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn strip_flag(arg: &str, flags: &[&str]) -> String {
    let mut v = arg.to_string();
    for flag in flags {
        if let Some(rest) = v.strip_prefix(flag) {
            v = rest.to_string();
            break;
        }
    }
    let v = v.replace("\"", "").replace("\'", "");
    match v.strip_prefix('=') {
        Some(rest) => rest.to_string(),
        None => v,
    }
}

fn run() -> Result<()> {
    let sep: &str = &path::MAIN_SEPARATOR.to_string();
    let mut working_dir = String::new();
    let mut tool_name = String::new();
    let mut run_tool = false;
    let mut tool_help = false;
    let mut tool_parameters = false;
    let mut toolbox = false;
    let mut view_code = false;
    let mut list_tools = false;
    let mut keywords: Vec<String> = vec![];
    let mut finding_keywords = false;
    let mut tool_args_vec: Vec<String> = vec![];
    let mut verbose = false;
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        help();
        return Ok(());
    }
    for arg in args {
        let flag_val = arg.to_lowercase().replace("--", "-");
        if flag_val == "-h" || flag_val == "-help" {
            help();
            return Ok(());
        } else if flag_val.starts_with("-cd") || flag_val.starts_with("-wd") {
            let mut v = strip_flag(&arg, &["--cd", "--wd", "-cd", "-wd"]);
            if !v.is_empty() && !v.ends_with(sep) {
                v.push_str(sep);
            }
            working_dir = v;
            finding_keywords = false;
        } else if flag_val.starts_with("-run") || flag_val.starts_with("-r=") || flag_val == "-r" {
            tool_name = strip_flag(&arg, &["--run", "-run", "-r"]);
            run_tool = true;
            finding_keywords = false;
        } else if flag_val.starts_with("-toolhelp") {
            tool_name = strip_flag(&arg, &["--toolhelp", "-toolhelp"]);
            tool_help = true;
            finding_keywords = false;
        } else if flag_val.starts_with("-toolparameters") {
            tool_name = strip_flag(&arg, &["--toolparameters", "-toolparameters"]);
            tool_parameters = true;
            finding_keywords = false;
        } else if flag_val.starts_with("-toolbox") {
            tool_name = strip_flag(&arg, &["--toolbox", "-toolbox"]);
            toolbox = true;
            finding_keywords = false;
        } else if flag_val.starts_with("-viewcode") {
            tool_name = strip_flag(&arg, &["--viewcode", "-viewcode"]);
            view_code = true;
            finding_keywords = false;
        } else if flag_val.starts_with("-listtools") || flag_val.starts_with("-list_tools") {
            list_tools = true;
            finding_keywords = true;
        } else if flag_val.starts_with("-license")
            || flag_val.starts_with("-licence")
            || flag_val == "-l"
        {
            license();
            return Ok(());
        } else if flag_val.starts_with("-version") {
            version();
            return Ok(());
        } else if flag_val == "-v" || flag_val == "-verbose" {
            verbose = true;
            finding_keywords = false;
        } else if arg.starts_with('-') {
            // it's an arg to be fed to the tool
            tool_args_vec.push(arg.trim().to_string());
            finding_keywords = false;
        } else if finding_keywords {
            keywords.push(arg.trim().to_string());
        } else if !arg.trim().is_empty() {
            // a value following a space-separated tool flag
            tool_args_vec.push(arg.trim().to_string());
        }
    }

    init_logging(verbose);

    if working_dir.is_empty() {
        let configs = hydro_tools::configs::get_configs()?;
        working_dir = configs.working_directory;
        if !working_dir.is_empty() && !working_dir.ends_with(sep) {
            working_dir.push_str(sep);
        }
    }

    let tm = ToolManager::new(&working_dir, &verbose)?;
    if run_tool {
        tracing::info!(tool = %tool_name, "running tool");
        return tm.run_tool(tool_name, tool_args_vec);
    } else if tool_help {
        return tm.tool_help(tool_name);
    } else if tool_parameters {
        return tm.tool_parameters(tool_name);
    } else if toolbox {
        return tm.toolbox(tool_name);
    } else if view_code {
        return tm.get_tool_source_code(tool_name);
    } else if list_tools {
        if keywords.is_empty() {
            tm.list_tools();
        } else {
            tm.list_tools_with_keywords(keywords);
        }
    }

    Ok(())
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("hydro_tools{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "hydro_tools Help

The following commands are recognized:
--cd, --wd          Changes the working directory; used in conjunction with --run flag.
-h, --help          Prints help information.
-l, --license       Prints the hydro_tools license.
--listtools         Lists all available tools. Keywords may also be used, --listtools slope flow.
-r, --run           Runs a tool; used in conjunction with --wd flag; -r=\"FillPits\".
--toolbox           Prints the toolbox associated with a tool; --toolbox=Slope.
--toolhelp          Prints the help associated with a tool; --toolhelp=\"FillPits\".
--toolparameters    Prints the parameters (in json form) for a specific tool; --toolparameters=\"FillPits\".
--viewcode          Prints the source file of a specific tool; --viewcode=\"FillPits\".
-v                  Verbose mode. Without this flag, tool outputs will not be printed.
--version           Prints the version information.

Settings are read from settings.json in the current directory when present.

Example Usage:
>> .*EXE_NAME -r=FillPits -v --wd=\"*path*to*data*\" --dem=DEM.asc -o=filled.asc
>> .*EXE_NAME -r=D8Pointer -v --wd=\"*path*to*data*\" --dem=filled.asc -o=flow.asc
"
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn license() {
    let license_text = "hydro_tools License

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the \"Software\"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.";
    println!("{}", license_text);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!("hydro_tools v{}", VERSION.unwrap_or("unknown"));
}
