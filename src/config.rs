use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::static_site::SiteRewrite;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub data: DataConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub firebase: FirebaseSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory the static front-end is served from
    pub root: PathBuf,
    /// Page served with a 404 status on a miss, relative to `root`
    pub not_found_page: String,
    #[serde(default)]
    pub rewrites: Vec<SiteRewrite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding guides.json and sponsor-referrals.json
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirebaseSettings {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub app_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            site: SiteConfig::default(),
            data: DataConfig::default(),
            database: DatabaseConfig::default(),
            firebase: FirebaseSettings::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            not_found_page: "404.html".to_string(),
            rewrites: Vec::new(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_connections: Some(5),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and the environment
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // Structured overrides, e.g. TOMOTRIP_SITE_ROOT=public
        config = config.add_source(
            config::Environment::with_prefix("TOMOTRIP")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.apply_plain_env(|key| std::env::var(key).ok())?;

        Ok(app_config)
    }

    /// Apply the unprefixed variables the deployment platform sets (PORT, HOST)
    /// and the Firebase credentials.
    pub fn apply_plain_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT '{}': {}", port, e))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        let firebase = &mut self.firebase;
        let pairs: [(&str, &mut Option<String>); 5] = [
            ("VITE_FIREBASE_API_KEY", &mut firebase.api_key),
            ("VITE_FIREBASE_PROJECT_ID", &mut firebase.project_id),
            ("VITE_FIREBASE_APP_ID", &mut firebase.app_id),
            ("FIREBASE_CLIENT_EMAIL", &mut firebase.client_email),
            ("FIREBASE_PRIVATE_KEY", &mut firebase.private_key),
        ];
        for (key, slot) in pairs {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }

        Ok(())
    }

    /// Get the database URL from config or environment
    pub fn database_url(&self) -> anyhow::Result<String> {
        if let Some(connection_string) = &self.database.connection_string {
            return Ok(connection_string.clone());
        }

        std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
