#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tomotrip_server::run_server().await
}
