#[macro_use]
extern crate diesel;

use actix_web::web::ServiceConfig;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod feedback;
pub mod ledger;
pub mod response;
pub mod schema;
pub mod vote;

pub type DBPool = Pool<ConnectionManager<PgConnection>>;

pub fn init_pool(database_url: &str, max_size: u32) -> Result<DBPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Registers the vote routes. The caller supplies `Data<dyn VoteLedger>` and
/// `Data<TokenService>` as app data.
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(vote::toggle).service(vote::status);
}
