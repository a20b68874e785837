//! HTTP front end serving video info, proxied stream segments and thumbnails

pub mod handlers;
pub mod routes;

use crate::core::context::{Caches, ResolverContext};
use crate::error::ParserError;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Period of the background sweep over the response caches
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub use handlers::{dispatch, filter_headers};
pub use routes::VideoRoute;

/// State shared by every request
pub struct ServerState {
    pub ctx: ResolverContext,
    /// Include stream urls in info JSON
    pub expose_urls: bool,
}

impl ServerState {
    pub fn new(ctx: ResolverContext, expose_urls: bool) -> Self {
        Self { ctx, expose_urls }
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/video/{*path}", get(dispatch))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Periodically drop stale entries for ids nobody asks for again
pub fn spawn_sweeper(caches: Caches, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            caches.cleanup_expired();
            debug!(
                "Swept caches: {} bodies, {} info, {} streams left",
                caches.bodies.len(),
                caches.info.len(),
                caches.streams.len()
            );
        }
    })
}

/// Serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: Arc<ServerState>) -> Result<(), ParserError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let sweeper = spawn_sweeper(state.ctx.caches().clone(), SWEEP_INTERVAL);
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await;
    sweeper.abort();
    served?;
    Ok(())
}
