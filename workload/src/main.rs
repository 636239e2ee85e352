mod cli;
mod load;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
