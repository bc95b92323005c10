use clap::Parser;
use std::error::Error;
use subnet_algebra::cli::{init_logging, run, Cli};

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_config)?;
    log::info!("#Start main()");

    run(&cli)
}
