use anyhow::Context;
use clap::Parser;
use tamadex_app::{execute, init_tracing, AppState, Cli};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    info!("Starting Tamadex v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.load_config().context("failed to load configuration")?;
    let state = AppState::init(config)
        .await
        .context("failed to initialize application state")?;
    state
        .wait_until_hydrated()
        .await
        .context("favorites never finished loading")?;

    let outcome = execute(&state, &cli.command);
    // Flush favorites even when the command failed
    state.shutdown().await.context("failed to shut down")?;

    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
