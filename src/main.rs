//! ixctl - IXML-based GPU telemetry tool
//!
//! A command-line tool for inspecting Iluvatar CoreX GPUs via the
//! vendor's libixml.so.

use clap::Parser;
use ixctl::cli::args::{generate_completions, Cli, Commands};
use ixctl::commands::{run_info, run_list, run_version};
use ixctl::error::IxmlError;
use ixctl::Ixml;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), IxmlError> {
    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let ixml = Ixml::init()?;

    let result = match &cli.command {
        Commands::List => run_list(&ixml, cli.format),
        Commands::Info => run_info(&ixml, cli.format, cli.gpu, cli.gpu_uuid.as_deref()),
        Commands::Version => run_version(&ixml, cli.format),
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    // Shut down even when the command failed; the command error wins.
    let shutdown = ixml.shutdown();
    result.and(shutdown)
}

fn print_error(err: &IxmlError) {
    eprintln!("Error: {}", err);

    match err {
        IxmlError::LibraryNotFound(_) => {
            eprintln!();
            eprintln!("Hint: Make sure the Iluvatar CoreX driver is installed");
            eprintln!("      and libixml.so is on the dynamic linker path.");
        }
        IxmlError::SymbolNotFound(_) => {
            eprintln!();
            eprintln!("Hint: The installed libixml.so is missing expected exports.");
            eprintln!("      Check that the driver version matches this tool.");
        }
        _ => {}
    }
}
