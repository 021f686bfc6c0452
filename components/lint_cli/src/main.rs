//! Corten JavaScript linter CLI
//!
//! Entry point for `corten-lint`. Parses arguments, checks every source and
//! exits with 0 when nothing was found, 1 when findings were reported and 2
//! when the check itself failed.

use clap::Parser as ClapParser;
use lint_cli::{logging, runner, watch, Cli, CliResult, FileReport};
use std::process::ExitCode;

/// Exit code for usage, configuration and I/O failures.
const FAILURE: u8 = 2;

fn run(cli: &Cli) -> CliResult<i32> {
    let config = cli.load_config()?;
    let (mut reports, failures) = if cli.files.is_empty() {
        (vec![runner::lint_reader(std::io::stdin().lock(), &config)?], Vec::new())
    } else {
        runner::lint_files(&runner::collect_sources(&cli.files)?, &config)
    };
    for failure in &failures {
        eprintln!("corten-lint: {}", failure);
    }
    if cli.quiet {
        reports = reports.into_iter().map(FileReport::errors_only).collect();
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runner::write_reports(&mut out, &reports, cli.format)?;

    if cli.watch && !cli.files.is_empty() {
        watch::watch(&cli.files, &config, cli.format, cli.quiet, &mut out)?;
    }
    if failures.is_empty() {
        Ok(runner::exit_code(&reports))
    } else {
        Ok(i32::from(FAILURE))
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    logging::init_tracing();

    match run(&cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("corten-lint: {}", e);
            ExitCode::from(FAILURE)
        }
    }
}
