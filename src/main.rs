use clap::Parser;
use node_monitor::config::Config;
use node_monitor::{logger, NodeMonitor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logger::init();

    let monitor = NodeMonitor::new(config)?;
    monitor.run().await?;
    Ok(())
}
