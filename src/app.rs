use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{auth, crud, system};
use crate::middleware::{error_handler, require_auth};
use crate::models::{Contact, Project, Resource, Service, User};
use crate::state::AppState;

/// Whether creating a record requires a bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateAccess {
    Protected,
    /// Anyone may create (user sign-up)
    Public,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let max_body = state.config.server.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/api", api_routes(&state))
        .fallback(system::not_found)
        // Global middleware. The error stage sits innermost so it sees every
        // response produced by routing, handlers and the fallback.
        .layer(middleware::from_fn_with_state(state.clone(), error_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/contacts", resource_routes::<Contact>(state, CreateAccess::Protected))
        .nest("/projects", resource_routes::<Project>(state, CreateAccess::Protected))
        .nest("/services", resource_routes::<Service>(state, CreateAccess::Protected))
        .nest("/users", resource_routes::<User>(state, CreateAccess::Public))
        .route("/auth/signin", post(auth::sign_in))
}

/// Six CRUD routes for one resource. Reads are public, writes pass through
/// `require_auth` first.
pub fn resource_routes<R: Resource>(state: &AppState, create_access: CreateAccess) -> Router<AppState> {
    let guard = || middleware::from_fn_with_state(state.clone(), require_auth);

    let reads = Router::new()
        .route("/", get(crud::get_all::<R>))
        .route("/:id", get(crud::get_by_id::<R>));

    let create = Router::new().route("/", post(crud::create::<R>));
    let create = match create_access {
        CreateAccess::Protected => create.route_layer(guard()),
        CreateAccess::Public => create,
    };

    let writes = Router::new()
        .route("/", delete(crud::remove_all::<R>))
        .route("/:id", put(crud::update::<R>).delete(crud::remove::<R>))
        .route_layer(guard());

    // Reads merge last so unmatched methods fall through to an unguarded 405
    writes.merge(create).merge(reads)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
