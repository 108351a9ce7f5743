use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use brigade_api::{app, AppState, AuthConfig};
use brigade_store::{
    DbClient, HttpTicketRenderer, MenuRepository, OrderRepository, RedisClient, TicketService,
    UserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "brigade_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = brigade_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Brigade API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let db = Arc::new(db);

    let redis = Arc::new(
        RedisClient::new(&config.redis.url)
            .await
            .expect("Failed to connect to Redis"),
    );

    let renderer = Arc::new(
        HttpTicketRenderer::new(
            &config.tickets.service_url,
            Duration::from_secs(config.tickets.request_timeout_seconds),
        )
        .expect("Failed to build ticket service client"),
    );
    let tickets = Arc::new(TicketService::new(renderer, &config.tickets.output_dir));

    let app_state = AppState {
        db: db.clone(),
        redis: redis.clone(),
        users: Arc::new(UserRepository::new(db.pool.clone())),
        menu: Arc::new(MenuRepository::new(
            db.pool.clone(),
            redis.clone(),
            config.cache.menu_ttl_seconds,
        )),
        orders: Arc::new(OrderRepository::new(db.pool.clone())),
        tickets,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            access_expiration: config.auth.access_token_ttl_seconds,
            refresh_expiration: config.auth.refresh_token_ttl_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
