//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print configuration summary.
pub fn print_config_summary(folders: &[String], mode: &str, dry_run: bool) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Folders: {}", folders.join(", "));
    println!("  Mode: {}", mode);
    if dry_run {
        println!("  Dry run: no changes will be made");
    }
    println!();
}
