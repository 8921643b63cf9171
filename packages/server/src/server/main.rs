// Main entry point for the presence analyzer server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use gemini_client::GeminiClient;
use server_core::domains::analyzer::AnalyzerSettings;
use server_core::kernel::{
    BaseDocumentStore, BaseIdentityProvider, FirebaseAnonymousAuth, FirestoreDocumentStore,
    GeminiTextGenerator, InMemoryDocumentStore, LocalIdentityProvider, ServerDeps,
};
use server_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,gemini_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Online Presence Analyzer");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let ttl = config.session_ttl()?;
    let server_deps = build_deps(&config)?;
    let (app, sessions) = build_app(server_deps);

    // Drop idle sessions periodically
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.cleanup_expired(ttl).await;
        }
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Analyzer page: http://localhost:{}/", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Wire adapters from configuration, falling back to local ones when Firebase is not set up.
fn build_deps(config: &Config) -> Result<ServerDeps> {
    let mut client = GeminiClient::new(config.gemini_api_key.clone());
    if let Some(model) = &config.gemini_model {
        client = client.with_model(model.clone());
    }
    if let Some(base_url) = &config.gemini_base_url {
        client = client.with_base_url(base_url.clone());
    }
    tracing::info!(model = client.model(), "Gemini client ready");

    let identity_provider: Arc<dyn BaseIdentityProvider> = match &config.firebase_api_key {
        Some(key) => Arc::new(FirebaseAnonymousAuth::new(key.clone())?),
        None => {
            tracing::warn!("FIREBASE_API_KEY not set, using local anonymous identities");
            Arc::new(LocalIdentityProvider)
        }
    };

    let document_store: Arc<dyn BaseDocumentStore> = match &config.firebase_project_id {
        Some(project_id) => Arc::new(FirestoreDocumentStore::new(project_id.clone())?),
        None => {
            tracing::warn!("FIREBASE_PROJECT_ID not set, analyses are kept in memory only");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    Ok(ServerDeps::new(
        Arc::new(GeminiTextGenerator::new(client)),
        document_store,
        identity_provider,
        config.markup_renderer.build(),
        AnalyzerSettings {
            app_id: config.app_id.clone(),
            default_location: config.default_location.clone(),
        },
    ))
}
