use feature_assistant::{
    server, AssistantConfig, BoxedError, CommitOrchestrator, CommitOrchestratorOptions,
    GitRepository,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    // Honor `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AssistantConfig::from_env()?;
    info!(?config, "loaded configuration");

    if !config.context_path.exists() {
        warn!(
            path = %config.context_path.display(),
            "documentation file not found; chat requests will fail until it exists"
        );
    }

    let orchestrator = Arc::new(CommitOrchestrator::new(CommitOrchestratorOptions {
        model: Arc::new(config.language_model()?),
        version_control: Arc::new(
            GitRepository::new(config.repo_path.clone(), config.git_remote.clone())
                .with_timeout(config.git_timeout),
        ),
        protocol: config.protocol,
        repo_root: config.repo_path.clone(),
        context_path: config.context_path.clone(),
    }));

    let app = server::router(orchestrator);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|err| Box::new(err) as BoxedError)?;

    info!("Server listening on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| Box::new(err) as BoxedError)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
