//! ovpn3-tui: terminal front-end for the openvpn3-linux session manager.

mod app;
mod backend;
mod cli;
mod config;
mod constants;
mod core;
mod event;
mod logging;
mod state;
mod theme;
mod ui;

use clap::Parser;
use color_eyre::eyre::Result;

use crate::backend::dbus::DbusBackend;
use crate::cli::args::Args;
use crate::config::{AppConfig, Paths};
use crate::state::SavedUsernames;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let paths = Paths::resolve(args.config_dir.clone())?;
    let config = AppConfig::load(&paths.config_file())?;
    logging::init(&paths, args.log_level.as_deref(), &config.log_level)?;

    // The UI loop and the connect task share one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async move {
        let backend = DbusBackend::system().await?;
        match args.command {
            Some(command) => {
                cli::commands::run(&backend, command, &mut std::io::stdout().lock()).await
            }
            None => {
                let usernames = SavedUsernames::load(&paths.usernames_file())?;
                app::run(backend, config, paths, usernames).await
            }
        }
    })
}
