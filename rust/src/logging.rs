//! Logging macros for the schedule engine with verbosity level control.
//!
//! Output goes to stderr and costs nothing when disabled (verbosity=0).
//! Levels:
//! - 0: SILENT
//! - 1: SUMMARY (project finish, critical path, cycle and optimizer outcomes)
//! - 2: STEPS (per-task decisions: dropped references, duplicates, state changes)
//! - 3: DEBUG (per-node ES/EF/LS/LF values)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_STEPS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at SUMMARY level (verbosity >= 1).
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!("[pert] {}", format_args!($($arg)*));
        }
    };
}

/// Log at STEPS level (verbosity >= 2).
#[macro_export]
macro_rules! log_steps {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_STEPS {
            eprintln!("[pert]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[pert]     {}", format_args!($($arg)*));
        }
    };
}
