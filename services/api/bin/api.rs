//! Main Entrypoint for the EdTech API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading the tutor prompts and building the completion client.
//! 3. Opening the user store and course catalog.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use edtech_api::{
    config::Config, courses::CourseCatalog, router::create_router, sessions::SessionRegistry,
    state::AppState, users::UserStore,
};
use edtech_core::{
    conversation::ContextWindow,
    llm_client::{LlmClient, OpenAiCompatibleClient},
    prompts::TutorPrompts,
    tutor::{Tutor, TutorModels},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Loads the prompt directory, falling back to the built-in prompts when the
/// default directory is absent.
fn load_prompts(config: &Config) -> anyhow::Result<TutorPrompts> {
    if config.prompts_path.is_dir() {
        return TutorPrompts::load_dir(&config.prompts_path).with_context(|| {
            format!("Failed to load prompts from {}", config.prompts_path.display())
        });
    }
    if config.prompts_path_required {
        anyhow::bail!(
            "PROMPTS_PATH {} is not a directory",
            config.prompts_path.display()
        );
    }
    warn!(
        path = %config.prompts_path.display(),
        "Prompt directory not found, using built-in prompts"
    );
    Ok(TutorPrompts::default())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize the Tutor ---
    let prompts = load_prompts(&config)?;
    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.api_key)
        .with_api_base(&config.api_base);
    let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleClient::new(
        openai_config,
        config.provider_timeout,
    ));
    let tutor = Tutor::new(
        llm_client,
        TutorModels {
            classifier: config.classifier_model.clone(),
            chat: config.chat_model.clone(),
        },
        prompts,
        ContextWindow::from_turn_cap(config.max_context_turns),
    );

    // --- 4. Open the Portal Stores ---
    let users = UserStore::open(&config.users_file).with_context(|| {
        format!("Failed to open user file {}", config.users_file.display())
    })?;
    let courses = CourseCatalog::new(config.courses_root.clone());

    let app_state = Arc::new(AppState {
        users: Arc::new(users),
        courses: Arc::new(courses),
        sessions: Arc::new(SessionRegistry::new()),
        tutor: Arc::new(tutor),
    });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        chat_model = %config.chat_model,
        classifier_model = %config.classifier_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
