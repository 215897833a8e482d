use anyhow::Context;
use pizza_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv + logging
    setup_environment();

    print_banner();

    // 2. Load configuration
    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        strict_stage_stepping = config.strict_stage_stepping,
        admin_guest_coupon_bypass = config.admin_guest_coupon_bypass,
        "Pizza server starting..."
    );

    // 3. Open the database and wire services
    let state = ServerState::initialize(&config).context("Failed to initialize server state")?;

    // 4. Serve until Ctrl-C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
