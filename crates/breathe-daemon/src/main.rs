use std::net::SocketAddr;
use std::sync::Arc;

use breathe_core::system_clock;
use breathe_daemon::api::{router, AppState};
use breathe_daemon::auth::PlaceholderResolver;
use breathe_daemon::config::DaemonConfig;
use breathe_daemon::store::DashboardStore;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "breathe-daemon", version, about = "Email-triage dashboard daemon")]
struct Cli {
    /// Where the HTTP API will listen, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Workspace id the demo fixture is served under.
    #[arg(long, default_value = "demo")]
    workspace_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = DaemonConfig {
        listen: cli.listen,
        workspace_id: cli.workspace_id,
    };
    info!("starting daemon with config: {:?}", config);

    let store = DashboardStore::demo(&config.workspace_id);
    let sessions = Arc::new(PlaceholderResolver::new(&config.workspace_id));
    let state = AppState::new(store, sessions, system_clock())?;
    let app = router(state);

    let addr: SocketAddr = config.listen.parse()?;
    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
