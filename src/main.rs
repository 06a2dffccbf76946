use nss_portal::{
    AppState,
    config::{AppConfig, Env, StorageBackend},
    create_router,
    mailer::{MailerState, SmtpMailer, UnconfiguredMailer},
    repository::{PostgresRepository, RepositoryState},
    storage::{LocalStorage, S3StorageClient, StorageService, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: Configuration, Logging, Database,
/// Storage, Mail, and the HTTP Server.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter setup. RUST_LOG wins, with sensible defaults for
    // local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nss_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize logging based on environment.
    match config.env {
        Env::Local => {
            // LOCAL: pretty output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database initialization (Postgres) and embedded migrations.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to run database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Storage initialization. Local disk by default; S3/MinIO when the
    // configuration selects it.
    let storage: StorageState = match config.storage {
        StorageBackend::Local => {
            let local = LocalStorage::new(&config.upload_dir, &config.public_base_url);
            local.ensure_ready().await;
            Arc::new(local)
        }
        StorageBackend::S3 => {
            let client = S3StorageClient::new(
                &config.s3_endpoint,
                &config.s3_region,
                &config.s3_key,
                &config.s3_secret,
                &config.s3_bucket,
            )
            .await;
            // LOCAL-ONLY: auto-provision the MinIO bucket for the Dockerized
            // development setup.
            if config.env == Env::Local {
                client.ensure_ready().await;
            }
            Arc::new(client)
        }
    };

    // 6. Mail initialization. Without SMTP credentials the mail endpoints
    // report the service as unconfigured instead of blocking startup.
    let mailer: MailerState = match &config.smtp {
        Some(smtp) => match SmtpMailer::new(smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::warn!("SMTP configuration rejected, mail disabled: {}", e);
                Arc::new(UnconfiguredMailer)
            }
        },
        None => {
            tracing::info!("No SMTP credentials found, mail disabled");
            Arc::new(UnconfiguredMailer)
        }
    };

    // 7. Unified state assembly and server startup.
    let app_state = AppState {
        repo,
        storage,
        mailer,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
