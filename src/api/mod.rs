use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use time;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod customers;
mod dashboard;
mod discounts;
mod error;
mod observability;
mod purchases;
mod store_owners;
mod types;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub session_store: SqliteStore,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    // Sessions live in the same SQLite database as the ledger, so a restart
    // does not log anyone out.
    let session_store = SqliteStore::new(shared.store.conn.get_sqlite_connection_pool().clone());
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to migrate session store: {e}"))?;

    Ok(Arc::new(AppState {
        shared,
        session_store,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, idle_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_idle_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_layer = SessionManagerLayer::new(state.session_store.clone())
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(idle_minutes)));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/customer/login", post(auth::customer_login))
        .route("/auth/store-owner/login", post(auth::store_owner_login))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_principal))
        .route("/customers", get(customers::list_customers))
        .route("/customers", post(customers::register_customer))
        .route(
            "/customers/resolve/{barcode}",
            get(customers::resolve_customer),
        )
        .route("/customers/{id}", get(customers::get_customer))
        .route("/customers/{id}", put(customers::update_customer))
        .route(
            "/customers/{id}/purchases",
            get(customers::list_customer_purchases),
        )
        .route(
            "/customers/{id}/discounts",
            get(customers::list_customer_discounts),
        )
        .route(
            "/customers/{id}/points/adjust",
            post(customers::adjust_points),
        )
        .route("/purchases", post(purchases::record_purchase))
        .route("/discounts", post(discounts::create_discount))
        .route("/store-owners", get(store_owners::list_store_owners))
        .route("/store-owners", post(store_owners::create_store_owner))
        .route(
            "/store-owners/{id}/active",
            put(store_owners::set_store_owner_active),
        )
        .route("/store-owners/{id}", delete(store_owners::delete_store_owner))
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
