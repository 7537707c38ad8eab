//! HTTP API server for the company service.
//!
//! Exposes company CRUD over REST. Reads are open; mutations need a bearer
//! token. Structured logging via tracing, Prometheus metrics on `/metrics`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use company_store::CompanyStore;
use domain::CompanyService;
use metrics_exporter_prometheus::PrometheusHandle;
use publisher::EventPublisher;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use auth::{Caller, Claims, JwtAuth};
pub use config::{Config, LogFormat};
pub use error::ApiError;
use routes::companies::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, P>(state: Arc<AppState<S, P>>, metrics_handle: PrometheusHandle) -> Router
where
    S: CompanyStore + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/companies", post(routes::companies::create::<S, P>))
        .route(
            "/companies/{id}",
            get(routes::companies::get::<S, P>)
                .patch(routes::companies::update::<S, P>)
                .delete(routes::companies::delete::<S, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires a store and a publisher into the application state.
pub fn create_state<S, P>(store: S, publisher: P, jwt_secret: &str) -> Arc<AppState<S, P>>
where
    S: CompanyStore + 'static,
    P: EventPublisher + 'static,
{
    Arc::new(AppState {
        service: CompanyService::new(store, publisher),
        auth: JwtAuth::new(jwt_secret),
    })
}
