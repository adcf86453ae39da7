pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod validation;

use std::sync::Arc;

use crate::error::AppError;
use crate::server::AppState;

/// Wire everything together and serve until shutdown.
pub async fn run() -> Result<(), AppError> {
    // Load a local .env if present; real deployments set the environment.
    let _ = dotenvy::dotenv();

    logging::init();

    tracing::info!("Starting PromptForge v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env()?;

    let pool = db::init_db(&config.data_dir)?;
    tracing::info!("Database pool ready (max_size=8)");

    let llm = Arc::new(llm::openai::OpenAiClient::new(
        config.llm_base_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    ));
    let auth = Arc::new(auth::AuthClient::new(config.auth_base_url.clone()));

    let state = Arc::new(AppState { pool, llm, auth });

    server::serve(state, config.bind_addr).await
}
