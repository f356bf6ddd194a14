pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod export;
pub mod ranking;
pub mod services;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use cli::Cli;
use log::info;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::database::DbConn;
use crate::domain::{CategorySelector, GenderSelector};
use crate::services::results::ResultService;
use crate::services::server::ServerService;
use crate::services::snapshots::SnapshotService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_database(config: &AppConfig) -> Result<DbConn> {
    let pool = database::create_pool(&config.database.path)?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::ensure_schema(&mut conn)?;
    Ok(conn)
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init(reset: bool) -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.database.path)?;
    let mut conn = database::get_connection(&pool)?;

    if reset {
        database::setup::reset_database(&mut conn)
    } else {
        database::setup::ensure_schema(&mut conn)
    }
}

pub fn handle_snapshot(gender: &str, category: &str, name: Option<&str>) -> Result<()> {
    let gender: GenderSelector = gender.parse()?;
    let category: CategorySelector = category.parse()?;

    let config = AppConfig::new();
    let mut conn = open_database(&config)?;
    let outcome = SnapshotService::new(&mut conn, &config).generate(gender, category, name, Utc::now().naive_utc());

    if !outcome.success {
        bail!("{}", outcome.message);
    }
    info!("{}", outcome.message);
    Ok(())
}

pub fn handle_publish(id: i64, private: bool) -> Result<()> {
    let config = AppConfig::new();
    let mut conn = open_database(&config)?;
    SnapshotService::new(&mut conn, &config).set_visibility(id, !private)?;
    Ok(())
}

pub fn handle_export(id: i64, output: Option<&str>) -> Result<()> {
    let config = AppConfig::new();
    let mut conn = open_database(&config)?;
    let text = export::snapshot_csv(&mut conn, id)?;

    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write {path}"))?;
            info!("Snapshot {id} exported to {path}");
        }
        None => print!("{text}"),
    }
    Ok(())
}

pub fn handle_recalculate(event_id: i64) -> Result<()> {
    let config = AppConfig::new();
    let mut conn = open_database(&config)?;
    ResultService::new(&mut conn).recalculate_event(event_id)?;
    Ok(())
}
