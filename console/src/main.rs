//! Main entry point for the game-operations console.
//!
//! This file wires the configuration, HTTP transport, session store and
//! authentication context together and hands control to the interactive
//! shell. It orchestrates startup and defines the crate's module layout.

mod api;
mod auth;
mod config;
mod errors;
mod http;
mod routes;
mod search;
mod session;
mod shell;
mod tables;
#[cfg(test)]
mod testutil;
mod utils;

use config::Config;
use shell::Shell;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    info!("Console starting against {}", config.api_base_url);

    let mut shell = Shell::new(config).unwrap();
    shell.run().await.unwrap();
}
