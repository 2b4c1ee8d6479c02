// Entrypoint for the CLI application.
// - Keeps `main` small: resolve the endpoint, build the client and hand it
//   to the shell loop.
// - Anything that fails before the loop starts is fatal and logged with its
//   full cause chain.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use smarthome_cli::api::RemoteClient;
use smarthome_cli::config::{Args, Endpoint};
use smarthome_cli::console::TermConsole;
use smarthome_cli::ui::Shell;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:?}", err);
            eprintln!("[ERRO] {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let endpoint = Endpoint::from_env(args).context("Failed to resolve server address")?;
    let client = RemoteClient::new(&endpoint).context("Failed to build HTTP client")?;
    info!("using server {}", client.base_url());

    println!("========================================");
    println!("Cliente Remoto Smart Home (Rust)");
    println!("========================================");
    println!("Conectado a: {}", endpoint);

    // Blocks until the operator picks the exit option.
    let mut shell = Shell::new(client, TermConsole::new());
    shell.run().context("Console input closed")?;
    Ok(())
}
