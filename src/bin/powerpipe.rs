//! Powerpipe CLI Binary

use std::env;
use std::process;

use powerpipe::cli::Bootstrap;
use powerpipe::commands::root_command;
use powerpipe::config::ConfigLoader;
use powerpipe::logging::init_logging;
use tracing::{error, info};

fn main() {
    let layers = match ConfigLoader::load() {
        Ok(layers) => layers,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let logging = match layers.file_config() {
        Ok(file) => file.logging,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Powerpipe CLI starting");

    let root = match root_command() {
        Ok(root) => root.with_layers(layers),
        Err(e) => {
            error!("Command registration failed: {}", e);
            eprintln!("fatal: {}", e);
            process::exit(1);
        }
    };

    let code = Bootstrap::new()
        .handle_interrupts(true)
        .run(&root, env::args_os().skip(1));
    process::exit(code);
}
