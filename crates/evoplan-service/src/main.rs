use clap::Parser;
use evoplan_core::config::SearchParams;
use evoplan_service::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
struct Args {
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Period of the background sweep for deadlines and expired plans.
    #[arg(long, default_value_t = 60)]
    tick_seconds: u64,

    #[command(flatten)]
    search: SearchParams,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    info!("🗓️ Evoplan service is initializing...");

    let state = Arc::new(AppState::new(args.search));
    tokio::spawn(evoplan_service::scheduler::run_ticker(
        state.clone(),
        std::time::Duration::from_secs(args.tick_seconds.max(1)),
    ));
    let app = evoplan_service::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("🚀 Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
