//! Static-only server for the in-store center display.

use tomotrip_server::config::AppConfig;
use tomotrip_server::static_site::{center_display_rewrites, StaticSite};
use tomotrip_server::{init_logging, serve_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::load()?;

    let mut rewrites = center_display_rewrites();
    // configured rewrites win over the built-in detail pages
    rewrites.retain(|r| !config.site.rewrites.iter().any(|c| c.prefix == r.prefix));
    rewrites.extend(config.site.rewrites.iter().cloned());

    let site = StaticSite::from_config(&config.site).with_rewrites(rewrites);
    log::info!(
        "Center display serving {} with {} rewrites",
        site.root().display(),
        site.rewrites().len()
    );

    serve_app(site.router(), &config.server_address()).await
}
