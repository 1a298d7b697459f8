use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use log::info;

use feedback_api::auth::TokenService;
use feedback_api::config::Config;
use feedback_api::ledger::{PgLedger, VoteLedger};

#[actix_rt::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = feedback_api::init_pool(&config.database_url, config.pool_size)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let ledger: Arc<dyn VoteLedger> = Arc::new(PgLedger::new(pool));
    let ledger = Data::from(ledger);
    let tokens = Data::new(TokenService::new(&config.jwt_secret));

    info!("listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(ledger.clone())
            .app_data(tokens.clone())
            .wrap(Logger::default())
            .configure(feedback_api::routes)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
