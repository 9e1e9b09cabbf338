mod api;
mod calculator;
mod cli;
mod config;
mod db;
mod models;
mod store;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use api::ApiClient;
use cli::args::{Cli, Commands};
use cli::handlers;
use config::{AppConfig, Backend};
use db::LocalStore;
use models::WishAction;
use store::WishStore;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    run(cli.command, &mut config, cli.offline)
}

fn open_store(config: &AppConfig, offline: bool) -> Result<Box<dyn WishStore>> {
    let backend = if offline { Backend::Local } else { config.api.backend };
    match backend {
        Backend::Remote => {
            log::debug!("Using backend at {}", config.api.base_url);
            let client = ApiClient::new(&config.api.base_url)?;
            Ok(Box::new(client))
        }
        Backend::Local => {
            AppConfig::ensure_data_dir()?;
            let db_path = AppConfig::db_path()?;
            log::debug!("Using local database at {:?}", db_path);
            Ok(Box::new(LocalStore::open(&db_path)?))
        }
    }
}

/// Signed-in nick plus the store to talk to.
fn session(config: &AppConfig, offline: bool) -> Result<(Box<dyn WishStore>, &str)> {
    let nick = config.require_nick()?;
    Ok((open_store(config, offline)?, nick))
}

fn run(command: Commands, config: &mut AppConfig, offline: bool) -> Result<()> {
    match command {
        // Login only touches the config file
        Commands::Login { nick } => handlers::handle_login(config, &nick),
        Commands::Add {
            title,
            price,
            category,
            days,
        } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_add(store.as_ref(), config, nick, &title, price, &category, days)
        }
        Commands::List { status } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_list(store.as_ref(), nick, &status)
        }
        Commands::History => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_history(store.as_ref(), nick)
        }
        Commands::Complete { id } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_action(store.as_ref(), nick, &id, WishAction::Complete)
        }
        Commands::Cancel { id } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_action(store.as_ref(), nick, &id, WishAction::Cancel)
        }
        Commands::Delete { id, yes } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_delete(store.as_ref(), nick, &id, yes)
        }
        Commands::Review => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_review(store.as_ref(), nick)
        }
        Commands::Quote { price, category } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_quote(store.as_ref(), config, nick, price, &category)
        }
        Commands::Profile { action } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_profile(store.as_ref(), nick, &action)
        }
        Commands::Settings { action } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_settings(store.as_ref(), nick, &action)
        }
        Commands::Notify {
            title,
            message,
            kind,
        } => {
            let (store, nick) = session(config, offline)?;
            handlers::handle_notify(store.as_ref(), nick, &title, &message, &kind)
        }
    }
}
