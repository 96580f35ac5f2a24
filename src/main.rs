use axum::serve;
use replay_academy::api::routes::create_router;
use replay_academy::config::AppConfig;
use replay_academy::seed;
use replay_academy::sync::DataSync;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filters to keep transport noise down
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .init();

    println!("re: Play academy data server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    // Decide the session mode once and run the startup load
    let data_sync = Arc::new(DataSync::connect(&config).await);
    if data_sync.is_offline() {
        println!("Running in offline mode: edits stay in memory for this session");
    } else {
        println!("Connected to project '{}'", config.firebase.project_id);
    }

    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        println!("Loading seed data...");
        seed::load_seed_data(&data_sync).await;
        println!("Seed data loaded successfully");
    }

    run_server(create_router().with_state(data_sync), &config).await?;

    Ok(())
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Academy server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
