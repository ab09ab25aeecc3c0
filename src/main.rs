mod cli;

use clap::Parser;

use cli::handlers::{check::handle_check, demo::handle_demo, describe::handle_describe};
use portkit::args::{Args, Command};
use portkit::errors::AppError;
use portkit::logging::init_logging;
use portkit::AppConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let config = AppConfig::load_or_default(args.config.as_deref())?;
    let mut logging = config.logging.clone();
    if args.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&logging).map_err(|e| AppError::Logging(e.to_string()))?;

    match &args.command {
        Command::Describe => handle_describe(&config)?,
        Command::Check { skip_resolve } => handle_check(&config, *skip_resolve).await?,
        Command::Demo { email } => handle_demo(&config, email).await?,
    }

    Ok(())
}
