//! Dashboard server setup

use super::{
    handlers::DashboardState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::{
    config::DashboardConfig,
    errors::{CoinbotResult, ConfigurationError},
    ledger::LedgerReader,
};
use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

pub struct DashboardServer {
    config: DashboardConfig,
    reader: LedgerReader,
}

impl DashboardServer {
    pub fn new(config: DashboardConfig, reader: LedgerReader) -> Self {
        Self { config, reader }
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn run(self) -> CoinbotResult<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn run_until<F>(self, shutdown: F) -> CoinbotResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.socket_addr()?;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, origins = ?self.config.allowed_origins, "Dashboard listening");
        info!("   GET  /            - Users table");
        info!("   GET  /api/users   - Users snapshot (JSON)");
        info!("   GET  /health      - Health check");

        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        info!("Dashboard stopped gracefully");
        Ok(())
    }

    /// Full application with its middleware stack
    pub fn router(&self) -> axum::Router {
        let state = Arc::new(DashboardState {
            reader: self.reader.clone(),
        });

        create_router(state)
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(create_cors_layer(&self.config.allowed_origins))
            .layer(TimeoutLayer::new(self.config.request_timeout()))
            .layer(TraceLayer::new_for_http())
    }

    fn socket_addr(&self) -> CoinbotResult<SocketAddr> {
        let ip: IpAddr = self.config.host.parse().map_err(|e: std::net::AddrParseError| {
            ConfigurationError::InvalidValue {
                field: "dashboard.host".to_string(),
                value: self.config.host.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(SocketAddr::from((ip, self.config.port)))
    }
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CoinbotConfig,
        dashboard::models::UsersSnapshot,
        ledger::Ledger,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn server() -> (TempDir, Arc<Ledger>, DashboardServer) {
        let dir = TempDir::new().unwrap();
        let config = CoinbotConfig::ephemeral(dir.path());
        let ledger = Arc::new(Ledger::open(&config).unwrap());
        let server = DashboardServer::new(config.dashboard.clone(), ledger.reader());
        (dir, ledger, server)
    }

    async fn get(server: &DashboardServer, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = server
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, _ledger, server) = server();
        let (status, headers, body) = get(&server, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(String::from_utf8(body).unwrap(), r#"{"status":"Running"}"#);
    }

    #[tokio::test]
    async fn test_users_snapshot_totals() {
        let (_dir, ledger, server) = server();
        ledger.get_or_create(3).unwrap();
        ledger.get_or_create(-2).unwrap();
        ledger.adjust_balance(3, 10).unwrap();

        let (status, _, body) = get(&server, "/api/users").await;
        assert_eq!(status, StatusCode::OK);

        let snapshot: UsersSnapshot = serde_json::from_slice(&body).unwrap();
        assert_eq!(snapshot.total_users, 2);
        assert_eq!(snapshot.total_balance, 20);
        let ids: Vec<_> = snapshot.users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![-2, 3]);
    }

    #[tokio::test]
    async fn test_index_renders_rows() {
        let (_dir, ledger, server) = server();
        ledger.get_or_create(77).unwrap();

        let (status, headers, body) = get(&server, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers["content-type"].to_str().unwrap().starts_with("text/html"));

        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("<tr><td>77</td><td>5</td><td>0</td></tr>"));
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let (_dir, _ledger, server) = server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (_dir, _ledger, server) = server();
        let (status, _, _) = get(&server, "/admin").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_host_is_configuration_error() {
        let (_dir, ledger, _) = server();
        let config = DashboardConfig {
            host: "not-an-ip".to_string(),
            ..Default::default()
        };
        let server = DashboardServer::new(config, ledger.reader());
        assert!(server.socket_addr().is_err());
    }
}
