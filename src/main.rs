use dotenv::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    _ = dotenv();

    kazeta::run().await
}
