pub mod app_config;
pub mod database;
pub mod error;
pub mod menu_repo;
pub mod order_repo;
pub mod redis_repo;
pub mod tickets;
pub mod user_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use error::StoreError;
pub use menu_repo::MenuRepository;
pub use order_repo::OrderRepository;
pub use redis_repo::RedisClient;
pub use tickets::{HttpTicketRenderer, TicketService};
pub use user_repo::UserRepository;
