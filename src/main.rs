#[tokio::main]
async fn main() {
    if let Err(e) = xr_hands::frameworks::server::run_with_config().await {
        tracing::error!(error = %e, "scene server exited");
        std::process::exit(1);
    }
}
