use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::{SigilStore, Stores, UserStore};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::storage::MediaStorage;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sigils: Arc<dyn SigilStore>,
    pub users: Arc<dyn UserStore>,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, stores: Stores, media: MediaStorage) -> Self {
        Self {
            config,
            sigils: stores.sigils,
            users: stores.users,
            media,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // images are fetched by URL without an Authorization header
        .nest_service("/media", ServeDir::new(state.media.root()))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security))
        .with_state(state.clone());

    if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::sigils;

    Router::new()
        .route("/hello/", get(protected::hello_get))
        .route("/process-incantation/", post(protected::incantation_post))
        .route("/sigils/", get(sigils::list).post(sigils::create))
        .route("/sigils/:id/", get(sigils::show))
        // route_layer: later layers run first, so the JWT check precedes the user lookup
        .route_layer(middleware::from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
