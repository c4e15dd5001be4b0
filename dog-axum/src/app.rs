use axum::handler::Handler;
use axum::http::{HeaderName, Request};
use axum::routing::{any, get};
use axum::Router;
use dog_blob::RangeStreamer;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::stream::{no_such_blob, stream_router};
use crate::StreamState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AxumApp {
    pub state: StreamState,
    pub router: Router<()>,
}

impl AxumApp {
    pub fn new(streamer: RangeStreamer) -> Self {
        Self {
            state: StreamState::new(streamer),
            router: Router::new(),
        }
    }

    /// Chunks buffered per response before the streaming task waits on the client.
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.state = self.state.with_buffer(buffer);
        self
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        let router = Router::new().route("/", get(handler));
        self.use_router(path, router)
    }

    pub fn service<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        self.use_get(path, handler)
    }

    /// Mount `GET/HEAD {path}/{filename}`
    pub fn use_stream(self, path: &str) -> Self {
        let path = path.trim_end_matches('/');
        let router = stream_router(self.state.clone());
        let mut this = self.use_router(path, router);
        // The nested fallback's wildcard never matches an empty tail
        this.router = this.router.route(&format!("{path}/"), any(no_such_blob));
        this
    }

    /// Tag every request with `x-request-id` and trace it.
    ///
    /// Call this after all routes are mounted; layers only wrap what is
    /// already on the router.
    pub fn with_request_tracing(mut self) -> Self {
        let header = HeaderName::from_static(REQUEST_ID_HEADER);

        // Last layer added runs first: the id is set before the span is made.
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::new(header.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::new(header, MakeRequestUuid));
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = ?listener.local_addr()?, "listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler there is nothing to wait for; keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

pub fn axum(streamer: RangeStreamer) -> AxumApp {
    AxumApp::new(streamer)
}
