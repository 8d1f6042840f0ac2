pub mod auth;
pub mod db;
pub mod gateway;
pub mod routes;
pub mod wizard;

use db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub index_template: String,
}
