#![warn(unused_crate_dependencies)]

use crate::config::VERSION;
use axum::{self, Extension};
use config::load_config;
use log::{error, info};
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};

mod api;
mod auth;
mod config;
mod database;
mod differ;
mod env;
mod error;
mod events;
mod fanout;
mod item_router;
mod logging;
mod multidata;
mod session_runtime;
mod state;
mod static_data;
mod ticker;
mod utils;

use state::AppState;

#[tokio::main]
async fn main() {
    log_panics::init();

    let config = load_config().unwrap_or_default();
    logging::setup(config.logging);

    let port = env::u16_env(env::HTTP_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let state = match AppState::init(config).await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to initialize application state: {:?}", err);
            return;
        }
    };

    // Hourly idle-session visibility sweep (spec.md §3 lifecycle SUPPLEMENT)
    tokio::spawn(ticker::run(state.clone()));

    let router = api::router()
        .layer(Extension(state.db.clone()))
        .layer(Extension(state.server_key.clone()))
        .with_state(state);

    info!("Starting server on {} (v{})", addr, VERSION);

    let listener = match TcpListener::bind(addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind HTTP server on {}: {:?}", addr, err);
            return;
        }
    };

    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            _ = signal::ctrl_c().await;
        })
        .await
    {
        error!("Error within HTTP server {:?}", err);
    }
}
