use chrono::Local;
use ghostscrap::{config::Config, info_time, process::process_site, Result};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_time = Local::now();
    let config = Config::default();

    // Ctrl-C stops admitting new pages; whatever was recovered still gets written out.
    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info_time!("sending STOP signal");
            let _ = stop_tx.send(());
        }
    });

    let (_records, summary) = process_site(&config, Some(stop_rx)).await?;
    println!("\n{summary}");
    info_time!(start_time, "Full program time:");

    Ok(())
}
