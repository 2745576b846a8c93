#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aptfinder_lib::run().await
}
