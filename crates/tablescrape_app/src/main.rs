mod cli;
mod console;

use std::process::ExitCode;

use clap::Parser;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    let destination = if cli.log_file {
        console::logging::LogDestination::Both
    } else {
        console::logging::LogDestination::Terminal
    };
    console::logging::initialize(
        destination,
        tablescrape_logging::level_for_verbosity(cli.verbose),
    );
    console::app::run(cli)
}
