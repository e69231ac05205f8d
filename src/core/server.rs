//! HTTP endpoint serving collector output to Prometheus.
//!
//! Every `GET /metrics` runs one blocking device poll on tokio's blocking
//! pool. A failed poll answers 500 and leaves the server ready for the next
//! scrape.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::collectors::DeviceCollector;
use crate::core::metrics::encode_text;
use crate::error::{ExporterError, Result};

#[derive(Clone)]
struct ServerState {
    collector: Arc<dyn DeviceCollector>,
}

/// Serves one collector on `/metrics`
pub struct MetricsServer {
    bind_address: SocketAddr,
    collector: Arc<dyn DeviceCollector>,
}

impl MetricsServer {
    pub fn new(bind_address: SocketAddr, collector: Arc<dyn DeviceCollector>) -> Self {
        Self {
            bind_address,
            collector,
        }
    }

    /// Routes without a listener, so they can be driven directly
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handle_root))
            .route("/metrics", get(handle_metrics))
            .with_state(ServerState {
                collector: Arc::clone(&self.collector),
            })
    }

    /// Bind and serve until `shutdown_signal` resolves
    pub async fn run<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = TcpListener::bind(self.bind_address).await?;

        log::info!(
            "Serving {} metrics for {} at http://{}/metrics",
            self.collector.name(),
            self.collector.url(),
            listener.local_addr()?
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal.await;
                log::info!("Received shutdown signal, stopping...");
            })
            .await?;

        log::info!("Metrics server stopped");
        Ok(())
    }
}

async fn handle_root(State(state): State<ServerState>) -> Html<String> {
    Html(format!(
        "<html><head><title>{name} exporter</title></head><body>\
         <h1>{name} exporter</h1><p>Polling {url}</p>\
         <p><a href=\"/metrics\">Metrics</a></p></body></html>",
        name = state.collector.name(),
        url = state.collector.url(),
    ))
}

async fn handle_metrics(State(state): State<ServerState>) -> Response {
    let collector = Arc::clone(&state.collector);
    let scrape = tokio::task::spawn_blocking(move || -> Result<String> {
        let families = collector.fetch_and_translate()?;
        encode_text(&families)
    })
    .await;

    match scrape {
        Ok(Ok(body)) => {
            log::debug!("Scrape of {} succeeded", state.collector.url());
            (
                [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                body,
            )
                .into_response()
        }
        Ok(Err(e)) => scrape_failed(&state, e),
        Err(e) => scrape_failed(&state, ExporterError::Io(std::io::Error::other(e))),
    }
}

fn scrape_failed(state: &ServerState, error: ExporterError) -> Response {
    log::error!("Scrape of {} failed: {}", state.collector.url(), error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("scrape of {} failed: {}\n", state.collector.url(), error),
    )
        .into_response()
}
