/*
This code is part of the HydroTools raster hydrology library.
Created: 19/10/2026
Last Modified: 19/10/2026
License: MIT
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress from long-running passes and tells them when to stop.
///
/// `begin_task` is called once per pass with the total number of work units,
/// or `-1` when the total is not known in advance. Cancellation is
/// cooperative: passes poll `is_cancelled` at tile boundaries only.
pub trait ProgressMonitor {
    fn begin_task(&mut self, name: &str, total_units: i64);
    fn worked(&mut self, units: usize);
    fn is_cancelled(&self) -> bool;
    fn done(&mut self);
}

/// A shareable cancellation switch. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a progress sink should display after a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressReport {
    /// Completion percentage; always a multiple of 10.
    Percent(usize),
    /// The total is unknown.
    Indeterminate,
}

/// Bookkeeping shared by the progress sinks.
///
/// Percentages are reported in 10% steps and only when the step changes,
/// so the number of reports per task is bounded at eleven regardless of grid
/// size. Tasks with an unknown total report `Indeterminate` once.
#[derive(Debug, Default, Clone)]
pub struct ProgressState {
    task: String,
    total_units: i64,
    completed_units: usize,
    last_reported: Option<usize>,
    indeterminate_reported: bool,
}

impl ProgressState {
    pub fn begin(&mut self, name: &str, total_units: i64) {
        self.task = name.to_string();
        self.total_units = total_units;
        self.completed_units = 0;
        self.last_reported = None;
        self.indeterminate_reported = false;
    }

    /// Records `units` of completed work and returns a report if the
    /// displayed value should change.
    pub fn advance(&mut self, units: usize) -> Option<ProgressReport> {
        self.completed_units += units;
        if self.total_units < 0 {
            if self.indeterminate_reported {
                return None;
            }
            self.indeterminate_reported = true;
            return Some(ProgressReport::Indeterminate);
        }
        if self.total_units == 0 {
            return None;
        }
        let percent = (100 * self.completed_units / self.total_units as usize).min(100);
        let step = percent / 10 * 10;
        if self.last_reported == Some(step) {
            return None;
        }
        self.last_reported = Some(step);
        Some(ProgressReport::Percent(step))
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn total_units(&self) -> i64 {
        self.total_units
    }

    pub fn completed_units(&self) -> usize {
        self.completed_units
    }
}

/// Prints progress lines to stdout, e.g. `Filling pits: 40%`.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    state: ProgressState,
    cancel: CancelFlag,
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> ConsoleProgress {
        ConsoleProgress {
            verbose,
            ..Default::default()
        }
    }

    pub fn with_cancel_flag(verbose: bool, cancel: CancelFlag) -> ConsoleProgress {
        ConsoleProgress {
            verbose,
            cancel,
            ..Default::default()
        }
    }
}

impl ProgressMonitor for ConsoleProgress {
    fn begin_task(&mut self, name: &str, total_units: i64) {
        self.state.begin(name, total_units);
    }

    fn worked(&mut self, units: usize) {
        match self.state.advance(units) {
            Some(ProgressReport::Percent(p)) if self.verbose => {
                println!("{}: {}%", self.state.task(), p)
            }
            Some(ProgressReport::Indeterminate) if self.verbose => {
                println!("{}: ...", self.state.task())
            }
            _ => {}
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn done(&mut self) {}
}

/// Discards progress; still honours a cancellation flag.
#[derive(Debug, Default)]
pub struct NullProgress {
    cancel: CancelFlag,
}

impl NullProgress {
    pub fn with_cancel_flag(cancel: CancelFlag) -> NullProgress {
        NullProgress { cancel }
    }
}

impl ProgressMonitor for NullProgress {
    fn begin_task(&mut self, _name: &str, _total_units: i64) {}
    fn worked(&mut self, _units: usize) {}
    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
    fn done(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_reports_are_deciles() {
        let mut state = ProgressState::default();
        state.begin("Gradient", 1000);
        let mut reports = vec![];
        for _ in 0..1000 {
            if let Some(r) = state.advance(1) {
                reports.push(r);
            }
        }
        let expected: Vec<ProgressReport> = (0..=10)
            .map(|i| ProgressReport::Percent(i * 10))
            .collect();
        assert_eq!(reports, expected);
        assert_eq!(state.completed_units(), 1000);
    }

    #[test]
    fn test_large_steps_do_not_skip_reporting() {
        let mut state = ProgressState::default();
        state.begin("Slope", 100);
        assert_eq!(state.advance(7), Some(ProgressReport::Percent(0)));
        assert_eq!(state.advance(16), Some(ProgressReport::Percent(20)));
        assert_eq!(state.advance(5), None); // 28%
        assert_eq!(state.advance(100), Some(ProgressReport::Percent(100)));
        assert_eq!(state.advance(1), None);
    }

    #[test]
    fn test_unknown_total_is_indeterminate() {
        let mut state = ProgressState::default();
        state.begin("Filling pits", -1);
        assert_eq!(state.advance(1), Some(ProgressReport::Indeterminate));
        assert_eq!(state.advance(1), None);
        assert_eq!(state.advance(50), None);
        state.begin("Next", -1);
        assert_eq!(state.advance(1), Some(ProgressReport::Indeterminate));
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let monitor = NullProgress::with_cancel_flag(flag.clone());
        assert!(!monitor.is_cancelled());
        flag.cancel();
        assert!(monitor.is_cancelled());
    }
}
