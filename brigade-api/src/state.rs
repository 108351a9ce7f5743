use std::sync::Arc;

use brigade_store::{
    DbClient, MenuRepository, OrderRepository, RedisClient, TicketService, UserRepository,
};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub access_expiration: u64,
    pub refresh_expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub redis: Arc<RedisClient>,
    pub users: Arc<UserRepository>,
    pub menu: Arc<MenuRepository>,
    pub orders: Arc<OrderRepository>,
    pub tickets: Arc<TicketService>,
    pub auth: AuthConfig,
}
