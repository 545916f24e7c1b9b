#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inventory_lib::run().await
}
