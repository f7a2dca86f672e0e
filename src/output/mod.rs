//! Output module for console output and statistics.

pub mod console;
pub mod stats;

pub use console::{print_config_summary, print_error, print_info, print_warning};
pub use stats::{print_duplicates, print_folder_stats, print_run_stats};
