/// Application state and router builder
///
/// Defines the shared application state and assembles the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use crewline_api::{app::{AppState, build_router}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
///
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use crewline_shared::auth::{jwt, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; Arc keeps
/// the clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Route map
///
/// ```text
/// /
/// ├── /health                              GET   (public)
/// ├── /users/
/// │   ├── register/                        POST  (public)
/// │   ├── login/                           POST  (public)
/// │   ├── refresh/                         POST  (public)
/// │   └── logout/                          POST  (authenticated)
/// └── /teams/                              (all authenticated)
///     ├── create/                          POST
///     ├── my-teams/                        GET
///     ├── :id/                             GET
///     ├── :id/add-member/                  POST
///     ├── :id/remove-member/               POST
///     └── tasks/
///         ├── create/                      POST
///         ├── my-tasks/                    GET
///         ├── :id/update-status/           PATCH
///         ├── :id/assign/                  PATCH
///         └── :id/details/                 GET
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth endpoints
    let public_user_routes = Router::new()
        .route("/register/", post(routes::auth::register))
        .route("/login/", post(routes::auth::login))
        .route("/refresh/", post(routes::auth::refresh));

    // Logout needs an authenticated caller
    let private_user_routes = Router::new()
        .route("/logout/", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = public_user_routes.merge(private_user_routes);

    // Team and task endpoints (all require authentication)
    let team_routes = Router::new()
        .route("/create/", post(routes::teams::create_team))
        .route("/my-teams/", get(routes::teams::my_teams))
        .route("/:id/", get(routes::teams::team_detail))
        .route("/:id/add-member/", post(routes::teams::add_member))
        .route("/:id/remove-member/", post(routes::teams::remove_member))
        .route("/tasks/create/", post(routes::tasks::create_task))
        .route("/tasks/my-tasks/", get(routes::tasks::my_tasks))
        .route(
            "/tasks/:id/update-status/",
            patch(routes::tasks::update_status),
        )
        .route("/tasks/:id/assign/", patch(routes::tasks::assign_task))
        .route("/tasks/:id/details/", get(routes::tasks::team_task_details))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
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
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/users", user_routes)
        .nest("/teams", team_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer access token, then injects an
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_jwt(claims.sub);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
