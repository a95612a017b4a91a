//! HTTP API for Cardsmith.
//!
//! Requests are authenticated upstream; the gateway forwards the caller's
//! id in a header (see `server.user_header`) and every handler scopes its
//! work to that user.

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, CurrentUser};

use log::info;
use tokio::net::TcpListener;

/// Serve the API on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("serving flashcard API (addr={})", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down flashcard API");
        })
        .await
}
