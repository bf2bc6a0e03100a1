// Serves the `web/` directory so the browser build can be played locally.

#[tokio::main]
async fn main() {
    // Listen failures are fatal: no retry, no fallback port.
    if let Err(e) = web_snake::server::run_with_config().await {
        tracing::error!(error = %e, "asset server stopped");
        std::process::exit(1);
    }
}
