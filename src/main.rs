use clap::Parser;
use tracing_subscriber::EnvFilter;

use dms_bitvector::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("dms_bitvector=debug,info")
    } else {
        EnvFilter::new("dms_bitvector=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Run(args) => {
            cli::run::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Merge(args) => {
            cli::merge::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Summary(args) => {
            cli::summary_cmd::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
