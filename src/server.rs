// Static file server for the browser build of the game.

use crate::config;

use axum::Router;
use std::{io, net::SocketAddr, path::Path};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

/// Every request is answered from the asset tree; directories get their
/// `index.html` and paths climbing out of the root are not found.
pub fn router(root: impl AsRef<Path>) -> Router {
    Router::new().fallback_service(ServeDir::new(root.as_ref()))
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = if config::logging_enabled() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// No retry and no fallback port.
pub async fn bind(address: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address).await.map_err(|source| {
        tracing::error!(%address, error = %source, "failed to bind");
        ServerError::Bind { address, source }
    })
}

pub async fn run(listener: TcpListener, root: impl AsRef<Path>) -> Result<(), ServerError> {
    let address = listener.local_addr()?;
    tracing::info!(%address, root = %root.as_ref().display(), "serving assets");
    tracing::info!("snake game at http://localhost:{}", address.port());

    // Serve app and report errors rather than panicking
    axum::serve(listener, router(root)).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })?;
    Ok(())
}

pub async fn run_with_config() -> Result<(), ServerError> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));
    let listener = bind(address).await?;

    run(listener, config::asset_dir()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    const WEB_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/web");

    async fn get(uri: &str) -> Response {
        router(WEB_DIR)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn root_serves_the_index_page() {
        let res = get("/").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("game-canvas"));
        assert!(page.contains("pause-btn"));
        assert!(page.contains("new-game-btn"));
    }

    #[tokio::test]
    async fn files_are_served_with_their_type() {
        let res = get("/style.css").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/css"));

        let res = get("/main.js").await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_and_escaping_paths_are_not_found() {
        assert_eq!(get("/nope.js").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/../Cargo.toml").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/%2e%2e/Cargo.toml").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn binding_a_taken_port_fails() {
        let taken = bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
        let address = taken.local_addr().unwrap();

        let err = bind(address).await.unwrap_err();
        assert!(matches!(&err, ServerError::Bind { address: a, .. } if *a == address));
        assert!(err.to_string().starts_with(&format!("failed to bind {address}")));
    }
}
