pub mod api;
pub mod config;
pub mod images;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;
pub mod sync;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{validate_class, validate_instructor, validate_organization, ValidationError};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{FirestoreGateway, Gateway, MemoryGateway};

// Export the facade
pub use sync::{DataSync, Mode};

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with INFO level only (suppress DEBUG logs)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    // Load configuration
    let config = crate::config::AppConfig::load()?;

    // Decide the session mode and perform the startup load
    let data_sync = Arc::new(crate::sync::DataSync::connect(&config).await);

    // Create router with state
    let app = crate::api::routes::create_router().with_state(data_sync);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}
