use crate::error::Error;
use axum::routing::get_service;
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeFile;
use tracing::info;

/// Landing page router: `GET /` serves one file, everything else is 404.
pub fn build_router(index_file: impl AsRef<Path>) -> Router {
    Router::new().route("/", get_service(ServeFile::new(index_file)))
}

/// Serve the landing page until `shutdown` resolves.
pub async fn serve(
    port: u16,
    index_file: impl AsRef<Path>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, index = %index_file.as_ref().display(), "Landing page listening");

    axum::serve(listener, build_router(index_file))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
