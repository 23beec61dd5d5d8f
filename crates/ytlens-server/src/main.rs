mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use ytlens_insight::{InsightEngine, ModelSelection, OpenAiClient, OpenAiSettings, Sampling};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(ytlens_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = OpenAiClient::new(&OpenAiSettings {
        api_key: config.openai_api_key.clone(),
        base_url: config.openai_base_url.clone(),
        timeout_secs: config.request_timeout_secs,
    })?;
    let engine = InsightEngine::new(
        client,
        ModelSelection {
            comment_model: config.comment_model.clone(),
            chart_model: config.chart_model.clone(),
        },
        Sampling::from_seed(config.sampling_seed),
    );

    let app = build_app(
        AppState {
            engine: Arc::new(engine),
        },
        &config.allowed_origins,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        env = %config.env,
        addr = %config.bind_addr,
        comment_model = %config.comment_model,
        chart_model = %config.chart_model,
        "ytlens server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
