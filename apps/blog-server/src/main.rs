//! # Blog Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use tera::Tera;
use tracing_actix_web::TracingLogger;

use blog_infra::DatabaseConnections;
use blog_infra::auth::{Argon2PasswordService, JwtTokenService};

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!("Starting blog server on {}:{}", config.host, config.port);

    let connections = DatabaseConnections::init(&config.database)
        .await
        .context("failed to connect to the database")?;

    if config.auto_migrate {
        Migrator::up(&connections.main, None)
            .await
            .context("failed to apply migrations")?;
        tracing::info!("Migrations applied");
    }

    let templates = Tera::new(&config.templates_glob())
        .with_context(|| format!("failed to load templates from {}", config.templates_dir))?;

    let state = AppState::from_connection(
        connections.main.clone(),
        templates,
        Arc::new(JwtTokenService::from_env()),
        Arc::new(Argon2PasswordService::new()),
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::error::error_pages())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
