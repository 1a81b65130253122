use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::account::models::DEFAULT_ROLE_NAME;
use account_service::domain::account::ports::AccountServicePort;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::email::SmtpNotifier;
use account_service::outbound::repositories::PostgresRoleRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::SessionTokenIssuer;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        smtp_host = %config.smtp.host,
        public_url = %config.app.public_url,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let role_repository = PostgresRoleRepository::new(pg_pool.clone());
    let default_role = role_repository
        .find_by_name(DEFAULT_ROLE_NAME)
        .await?
        .ok_or_else(|| anyhow::anyhow!("default role '{}' is not seeded", DEFAULT_ROLE_NAME))?;
    tracing::info!(role_id = %default_role.id, role_name = %default_role.name, "Default role resolved");

    let session_issuer = Arc::new(SessionTokenIssuer::new(config.jwt.secret.as_bytes()));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let notifier = Arc::new(SmtpNotifier::new(&config.smtp)?);

    let account_service: Arc<dyn AccountServicePort> = Arc::new(AccountService::new(
        user_repository,
        notifier,
        session_issuer,
        default_role.id,
        config.app.public_url.clone(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
