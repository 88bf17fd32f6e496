use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::cache::{RedisConfig, RedisPool};
use common::database::{self, DatabaseConfig};
use common::error::DatabaseError;

use records::jwt::{JwtConfig, JwtService};
use records::oauth::{GoogleConfig, GoogleVerifier};
use records::rate_limiter::{RateLimiter, RateLimiterConfig};
use records::repositories::{StudentRepository, UserRepository};
use records::routes;
use records::session::SessionManager;
use records::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting student records service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    // Initialize the session store
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = Arc::new(RedisPool::new(&redis_config).await?);

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let sessions = SessionManager::new(redis_pool, jwt_service.session_expiry());
    let google = GoogleVerifier::new(GoogleConfig::from_env()?);
    let login_limiter = RateLimiter::new(RateLimiterConfig::default());

    let app_state = AppState {
        students: StudentRepository::new(pool.clone()),
        users: UserRepository::new(pool),
        jwt: jwt_service,
        sessions,
        google,
        login_limiter,
    };

    info!("Student records service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Student records service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
