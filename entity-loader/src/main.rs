mod api;
mod cli;
mod config;
mod pipeline;
mod workbook;

use clap::Parser;
use colored::*;
use std::process::exit;
use std::time::Instant;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Credentials may be supplied through .env instead of the config file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let started = Instant::now();
    let code = match cli::handler::handle_load_command(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            1
        }
    };

    println!("Execution time in sec : {:.2}", started.elapsed().as_secs_f64());
    exit(code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
