//! Fieldproof server binary.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fieldproof::server::run().await
}
