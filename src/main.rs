//! imap-dedup CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use imap_dedup::{
    cli::Args,
    config::{parse_sent_before, validate_config, Config},
    error::{exit_codes, Error, Result},
    output::{
        print_config_summary, print_duplicates, print_error, print_folder_stats, print_info,
        print_run_stats, print_warning,
    },
    scan::{self, RunOptions},
    session::{resolve_credentials, ImapSession, MailboxSession},
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Credentials(_)
                | Error::Authentication(_)
                | Error::Tls(_)
                | Error::Keyring(_) => ExitCode::from(exit_codes::CONNECT_ERROR as u8),
                Error::FolderUnavailable { .. }
                | Error::Session(_)
                | Error::Imap(_)
                | Error::StaleFolderHandle(_) => ExitCode::from(exit_codes::RUN_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config, args.list)?;

    let sent_before = match &config.options.sent_before {
        Some(date) => Some(parse_sent_before(date)?),
        None => None,
    };

    // Resolve credentials and connect
    let host = config.server.host.clone().unwrap_or_default();
    let credentials = resolve_credentials(&config.auth, &host)?;

    print_info(&format!("Connecting to {}...", host));
    let mut session = ImapSession::connect(
        &config.server,
        &credentials,
        sent_before,
        config.options.fetch_batch,
    )?;

    if args.list {
        for folder in session.list_folders(None)? {
            println!("{}", folder);
        }
        return Ok(());
    }

    print_config_summary(
        &config.options.folders,
        &config.options.mode.to_string(),
        config.options.dry_run,
    );

    if config.options.dry_run {
        print_warning("Dry run: deciding only, nothing will be marked");
    }

    // Run the engine
    let options = RunOptions::from_config(&config.options);
    let result = scan::run(&mut session, &config.options.folders, &options)?;

    // Report
    for outcome in &result.folders {
        print_folder_stats(outcome, result.dry_run);
        if config.options.show_duplicates {
            print_duplicates(outcome);
        }
    }

    print_run_stats(&result);

    if result.total_mark_failures() > 0 {
        return Err(Error::Session(format!(
            "{} message(s) could not be marked",
            result.total_mark_failures()
        )));
    }

    Ok(())
}
