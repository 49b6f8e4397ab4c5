// private sub-module defined in other files
mod progress;
mod tiled;

// exports identifiers from private sub-modules in the current module namespace
pub use self::progress::{
    CancelFlag, ConsoleProgress, NullProgress, ProgressMonitor, ProgressReport, ProgressState,
};
pub use self::tiled::{Outcome, RowBands, TileScheme, TiledRunner};

use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g.
/// `1min 34.852s`
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{:03}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{:03}s", sub_sec, sub_milli)
}
