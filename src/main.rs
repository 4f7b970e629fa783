use std::path::Path;

use clap::Parser;
use focusspace::cli::commands::Cli;
use focusspace::cli::handlers;
use focusspace::io::config_io;
use focusspace::logging;

fn main() {
    let cli = Cli::parse();

    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref().map(Path::new));
    let config = handlers::config_or_default(&data_dir);
    let spec = logging::effective_spec(&config.log.level, std::env::var(logging::LOG_ENV).ok());
    // Logging is best effort; a read-only data dir must not block commands
    if let Err(e) = logging::init_logging(&spec, &data_dir) {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = handlers::dispatch(cli) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
