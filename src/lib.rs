pub mod api;
pub mod config;
pub mod firebase;
pub mod logic;
pub mod model;
pub mod static_site;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use logic::{
    admin_overview, apply_edit, apply_update, approve, commission_dashboard, guide_dashboard,
    public_listing, rank_for_score, referral_stats, register, reject, store_dashboard,
    total_commission, RegistrationError,
};

// Export all model types
pub use model::*;

pub use firebase::{FirebaseConfig, FirebaseError, FirestoreClient, FirestoreMirror};
pub use static_site::{SiteRewrite, StaticSite};
pub use store::{JsonFileStore, Store, StoreError};

/// Initialise logging at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("sqlx", log::LevelFilter::Warn)
        .try_init();
}

/// Firestore client for the configured project, if credentials are present.
pub fn firestore_client(config: &config::AppConfig) -> Option<FirestoreClient> {
    if config.firebase.project_id.is_none() {
        log::info!("Firebase not configured; Firestore access disabled");
        return None;
    }
    match FirebaseConfig::from_settings(&config.firebase) {
        Ok(firebase) => {
            log::info!("Firestore enabled for project {}", firebase.project_id);
            Some(FirestoreClient::new(firebase))
        }
        Err(e) => {
            log::warn!("Firebase configuration ignored: {}", e);
            None
        }
    }
}

pub async fn serve_app(app: axum::Router, address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    log::info!("listening on http://{}", address);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the full site: JSON-backed API plus the static front-end.
pub async fn run_server() -> anyhow::Result<()> {
    use std::sync::Arc;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();
    init_logging();

    log::info!("TomoTrip server starting");

    let config = crate::config::AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let store = JsonFileStore::open(&config.data.dir)?;
    log::info!(
        "Data files: {} and {}",
        store.guides_path().display(),
        store.referrals_path().display()
    );

    let site = StaticSite::from_config(&config.site);
    log::info!("Serving static files from {}", site.root().display());

    let app = match firestore_client(&config) {
        Some(client) => {
            crate::api::routes::create_app(Arc::new(FirestoreMirror::new(store, client)), &site)
        }
        None => crate::api::routes::create_app(Arc::new(store), &site),
    };
    serve_app(app, &config.server_address()).await
}
