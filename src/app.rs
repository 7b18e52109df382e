use std::sync::{Arc, Mutex};

use actix_web::web;
use tracing::info;

use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::{add_log, start_server, HttpState};

pub async fn run() -> std::io::Result<()> {
    let config = AppConfig::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .try_init();

    let logs = Arc::new(Mutex::new(Vec::new()));
    let state = web::Data::new(HttpState::new(config.ingest.clone(), logs.clone()));

    info!(
        host = %config.server.host,
        port = config.server.port,
        decimal = ?config.ingest.decimal_separator,
        strict = config.ingest.strict_row_length,
        "Starting HTTP server"
    );
    add_log(
        &logs,
        "INFO",
        "System",
        &format!("Listening on {}:{}", config.server.host, config.server.port),
    );

    start_server(state, &config.server)?.await
}
