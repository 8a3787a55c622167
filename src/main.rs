mod config;
mod extract;
mod fetch;
mod llm;
mod pipeline;
mod planner;
mod rank;
mod search;
mod server;
mod translate;

pub const USER_AGENT: &str = concat!("fundscout/", env!("CARGO_PKG_VERSION"));

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::{Client, redirect};
use tracing::{info, warn};

use config::{LlmProvider, Settings};
use fetch::HttpFetcher;
use llm::{GeminiClient, Generator, OllamaClient};
use pipeline::Pipeline;
use search::SerpApiClient;
use translate::GoogleTranslator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("warning: failed to load .env: {e}");
    }

    let settings = Settings::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fundscout=info".parse()?),
        )
        .init();

    let http = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .redirect(redirect::Policy::limited(5))
        .build()?;

    let llm = match settings.llm {
        LlmProvider::Ollama => {
            let client = OllamaClient::new(
                http.clone(),
                &settings.ollama_url,
                &settings.ollama_model,
                settings.llm_timeout(),
            );
            info!(url = %settings.ollama_url, model = client.model(), "using ollama");
            Generator::Ollama(client)
        }
        LlmProvider::Gemini => Generator::Gemini(
            GeminiClient::from_env(http.clone(), settings.llm_timeout())
                .inspect_err(|e| tracing::error!("cannot start gemini backend: {e}"))?,
        ),
    };

    let search = SerpApiClient::from_env(http.clone());
    if !search.has_key() {
        warn!("SERPAPI_API_KEY not set: broad-mode searches will return no hits");
    }

    let options = settings.pipeline_options();
    info!(
        llm = llm.name(),
        mode = ?options.default_mode,
        langs = ?options.langs,
        intent_filter = options.intent_filter,
        "starting fundscout"
    );

    let pipeline = Pipeline::new(
        llm,
        GoogleTranslator::new(http.clone()),
        search,
        HttpFetcher::new(http),
        options,
    );
    let app = server::router(Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    info!(addr = %settings.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
