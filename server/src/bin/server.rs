use payguard_core::PayGuardConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,payguard_core=info,payguard_server=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let cfg = PayGuardConfig::load();
    info!(
        target: "server",
        speech = cfg.speech.enabled,
        cluster = %cfg.ledger.cluster,
        "Starting PayGuard"
    );

    payguard_server::serve(cfg).await
}
