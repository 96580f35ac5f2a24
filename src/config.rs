use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub firebase: FirebaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Backend project credentials. The defaults are non-functional placeholders
/// so the server still starts (and drops into offline mode) without a real
/// project configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub storage_bucket: String,
    /// Skip the network entirely and run the session against the in-memory
    /// snapshot only; used for local development.
    pub offline: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            firebase: FirebaseConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: "demo-key".to_string(),
            project_id: "demo-project".to_string(),
            storage_bucket: "demo-project.appspot.com".to_string(),
            offline: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file, and
    /// `ACADEMY_`-prefixed environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // Double underscore keeps two-word field names addressable, e.g.
        // ACADEMY_FIREBASE__PROJECT_ID.
        config = config.add_source(
            config::Environment::with_prefix("ACADEMY")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
