//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use traffic_router::config::ServiceConfig;
use traffic_router::{HttpServer, PredicateRegistry, Shutdown};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<ServiceConfig>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Compile `config` with `registry` and serve it on 127.0.0.1:0.
pub async fn start_server(config: ServiceConfig, registry: PredicateRegistry) -> TestServer {
    let server = HttpServer::new(config, registry).expect("routes compile");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (config_updates, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = server.run(listener, rx, server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        config_updates,
    }
}

/// Client that never reuses connections or goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
