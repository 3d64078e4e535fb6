use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;
use std::io;

use pow_ledger::api::{self, AppState};
use pow_ledger::config::NodeConfig;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let state = AppState::from_config(&config).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    info!(
        "NODE - id={} difficulty={} reward={} peers={}",
        state.node_id,
        config.ledger.initial_difficulty,
        config.ledger.block_reward,
        config.peers.len()
    );
    println!("⛓️ Starting ledger node at http://{}:{}", config.host, config.port);

    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
