//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Resolve each request against the current route table
//! - Swap in recompiled route tables on config reload

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::response::{no_route, RouteDecision};
use crate::lifecycle::shutdown;
use crate::routing::{PredicateRegistry, RouteError, Router as RouteTable};

/// Current route table, replaced wholesale on reload.
///
/// Readers never block; a swap drops the old table once the last
/// in-flight request holding it finishes.
pub struct RouterHandle {
    current: ArcSwap<RouteTable>,
}

impl RouterHandle {
    pub fn new(table: RouteTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    pub fn load(&self) -> Arc<RouteTable> {
        self.current.load_full()
    }

    pub fn store(&self, table: RouteTable) {
        self.current.store(Arc::new(table));
    }

    /// Compile `config` and swap it in. On error the current table stays.
    pub fn reload(&self, config: &ServiceConfig, registry: &PredicateRegistry) -> Result<(), RouteError> {
        let table = RouteTable::compile(&config.routes, registry)?;
        self.store(table);
        Ok(())
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouterHandle>,
}

/// HTTP server resolving requests to backend groups.
pub struct HttpServer {
    router: Router,
    routes: Arc<RouterHandle>,
    registry: Arc<PredicateRegistry>,
}

impl HttpServer {
    /// Compile the configured routes and build the server.
    pub fn new(config: ServiceConfig, registry: PredicateRegistry) -> Result<Self, RouteError> {
        let table = RouteTable::compile(&config.routes, &registry)?;
        let routes = Arc::new(RouterHandle::new(table));

        let state = AppState {
            routes: routes.clone(),
        };

        Ok(Self {
            router: Self::build_router(state),
            routes,
            registry: Arc::new(registry),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Handle to the live route table.
    pub fn routes(&self) -> Arc<RouterHandle> {
        self.routes.clone()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs arriving on `config_updates` are compiled and swapped in; a
    /// config that fails to compile is logged and ignored.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.load().len(),
            "HTTP server starting"
        );

        let routes = self.routes.clone();
        let registry = self.registry.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match routes.reload(&config, &registry) {
                    Ok(()) => tracing::info!(routes = config.routes.len(), "Route table reloaded"),
                    Err(e) => tracing::error!(error = %e, "Reload rejected, keeping current routes"),
                }
            }
        });

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        result
    }
}

/// Resolve the request against the current route table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let table = state.routes.load();

    match table.match_request(&request) {
        Some(route) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                route = %route.name,
                backend_group = %route.backend_group,
                "Route matched"
            );
            RouteDecision::from(route).into_response()
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "No route matched");
            no_route()
        }
    }
}
