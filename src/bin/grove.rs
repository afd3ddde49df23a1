//! Grove CLI Binary

use anyhow::Context;
use clap::Parser;
use grove::logging::init_logging_with_file;
use grove::tooling::cli::{Cli, CliContext, OutputFormat};
use std::io::IsTerminal;
use std::process;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let workspace = cli.workspace.clone();
    let mut config = CliContext::load_config(&workspace, cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    init_logging_with_file(Some(&config.logging), cli.log_file.clone())
        .context("Failed to initialize logging")?;

    let color = cli.format == OutputFormat::Text
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();
    let context = CliContext::new(config, workspace, cli.remote)
        .context("Failed to open explorer")?
        .with_format(cli.format)
        .with_color(color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let output = runtime.block_on(context.execute(&cli.command))?;
    println!("{}", output);
    Ok(())
}
