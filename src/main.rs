mod config;
mod generator;
mod handlers;
mod llm;
mod models;
mod router;
mod vendors;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use generator::{render::TemplateRenderer, Generator};
use llm::LlmClient;
use vendors::VendorRegistry;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub generator: Generator,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confsmith=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    if cfg.llm_api_key.is_empty() {
        tracing::warn!(
            "LLM_API_KEY not set - requirement-driven generation needs a per-request key"
        );
    }
    tracing::info!("Starting ConfSmith Server");
    tracing::info!("Templates: {}", cfg.templates_dir);
    tracing::info!("Output: {}", cfg.output_dir);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Build the vendor registry and template renderer
    let registry = VendorRegistry::builtin();
    let renderer = TemplateRenderer::from_dir(&cfg.templates_dir)?;

    // Text-generation client
    let llm = Arc::new(LlmClient::new(
        cfg.llm_api_base.clone(),
        cfg.llm_model.clone(),
    )?);

    let generator = Generator::new(registry, renderer, llm, cfg.llm_api_key.clone());

    // Create app state
    let state = Arc::new(AppState {
        config: cfg.clone(),
        generator,
    });

    // Build router
    let app = router::build(state, &cfg.frontend_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("ConfSmith listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ConfSmith shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
