mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::clients::GoogleOAuthClient;
use crate::features::auth::{
    routes as auth_routes, AuthService, MagicLinkService, SessionService,
};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::notifications::{AlertThrottle, LinkBuilder, NotificationService};
use crate::features::reports::{routes as reports_routes, ModerationPolicy, ReportService};
use crate::features::users::{routes as users_routes, UnsubscribeSigner, UserService, UsersState};
use crate::modules::mail::{mailer_from_config, Mailer};
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Starting Haux Alerte: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Email delivery (SMTP when configured, log-only otherwise)
    let mailer: Arc<dyn Mailer> = Arc::from(
        mailer_from_config(&config.mail)
            .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?,
    );

    // Users and sessions
    let user_service = Arc::new(UserService::new(pool.clone()));
    let session_service = Arc::new(SessionService::new(pool.clone()));
    let signer = UnsubscribeSigner::new(&config.app.secret);

    // Sign-in
    let magic_link_service = Arc::new(MagicLinkService::new(
        pool.clone(),
        Arc::clone(&mailer),
        config.app.public_url.clone(),
    ));
    let google_client = match (
        config.oauth.google_client_id.clone(),
        config.oauth.google_client_secret.clone(),
    ) {
        (Some(client_id), Some(client_secret)) => {
            tracing::info!("Google sign-in enabled");
            Some(GoogleOAuthClient::new(
                client_id,
                client_secret,
                format!("{}/api/auth/callback/google", config.app.public_url),
            ))
        }
        _ => {
            tracing::info!("Google sign-in disabled (no client credentials configured)");
            None
        }
    };
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_service),
        Arc::clone(&session_service),
        magic_link_service,
        google_client,
        config.app.frontend_url.clone(),
        config.app.secure_cookies,
    ));
    tracing::info!("Auth service initialized");

    // Notifications and reports
    let notification_service = Arc::new(NotificationService::new(
        pool.clone(),
        Arc::clone(&mailer),
        Arc::clone(&user_service),
        signer.clone(),
        AlertThrottle::from_hours(config.moderation.alert_cooldown_hours),
        config.moderation.admin_alert_recipients.clone(),
        LinkBuilder::new(
            config.app.frontend_url.clone(),
            config.app.public_url.clone(),
        ),
    ));
    let report_service = Arc::new(ReportService::new(
        pool.clone(),
        ModerationPolicy::from(&config.moderation),
        Arc::clone(&user_service),
        notification_service,
    ));
    tracing::info!("Report services initialized");

    // Initialize MinIO client for storage
    let minio_client = Arc::new(
        modules::storage::MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );
    tracing::info!("MinIO client initialized for bucket: {}", config.minio.bucket);

    let file_service = Arc::new(FileService::new(pool.clone(), minio_client));
    tracing::info!("File service initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let api_routes = Router::new()
        .merge(auth_routes(auth_service))
        .merge(reports_routes(report_service))
        .merge(users_routes(UsersState {
            user_service,
            signer,
            frontend_url: config.app.frontend_url.clone(),
        }))
        .merge(files_routes(file_service))
        .layer(from_fn_with_state(
            session_service,
            middleware::session_middleware,
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
