#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dashboard_gateway_lib::run().await
}
