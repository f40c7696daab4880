#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    sqlrag_server::start(config_path.as_deref()).await
}
