/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todolist_api::{app::{build_router, AppState}, config::Config};
/// use todolist_shared::{db::pool::{create_pool, DatabaseConfig}, store::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::new(&config.database.url, 10)).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        auth::jwt_auth_layer,
        security::{security_headers, SecurityHeaders},
    },
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use todolist_shared::{
    auth::{jwt::TokenIssuer, service::CredentialService},
    error::ServiceResult,
    store::Storage,
    tasks::TaskService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside
/// is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Register, login and token verification
    pub credentials: CredentialService,

    /// Ownership-scoped task operations
    pub tasks: TaskService,

    /// Backing store, for health checks
    pub storage: Arc<dyn Storage>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services onto one storage backend
    pub fn new<S>(storage: Arc<S>, config: Config) -> ServiceResult<Self>
    where
        S: Storage + 'static,
    {
        let tokens = TokenIssuer::new(
            config.jwt.secret.clone(),
            Duration::seconds(config.jwt.ttl_seconds),
        );
        let credentials = CredentialService::new(storage.clone(), tokens)?;
        let tasks = TaskService::new(storage.clone());

        Ok(Self {
            credentials,
            tasks,
            storage,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health
/// ├── /auth/
/// │   ├── POST   /register
/// │   └── POST   /login
/// └── /tasks/                 (bearer token)
///     ├── POST   /
///     ├── GET    /
///     ├── PATCH  /:id
///     └── DELETE /:id
/// ```
///
/// Outermost first: security headers, CORS, tracing, then per-route auth.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // route_layer so unknown paths still 404 instead of 401
    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task).get(routes::tasks::list_tasks))
        .route(
            "/:id",
            patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let cors = cors_layer(&state.config);
    let security = SecurityHeaders::new(state.config.api.production);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(middleware::from_fn_with_state(security, security_headers))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
