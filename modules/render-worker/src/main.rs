mod clients;
mod handler;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use debias_broker::{WorkQueueConsumer, RENDER_QUEUE};
use debias_common::{Config, RenderRequest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clients::Clients;
use handler::handle_render;

/// Concurrent in-flight pullers per process (§5: "many concurrent in-flight messages"). Each
/// puller is still batch-size 1, so memory stays bounded by this count rather than by queue
/// depth.
const WORKER_CONCURRENCY: usize = 8;

#[derive(Parser)]
#[command(name = "render-worker")]
#[command(about = "Consumes render-queue, headless-renders the URL, and runs the finish sequence")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("render_worker=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;
    config.log_redacted();

    let clients = Arc::new(Clients::connect(&config).await?);
    info!(
        domains = clients.parsers.domains().collect::<Vec<_>>().len(),
        "registered parsers"
    );

    let consumer = Arc::new(clients.broker.consumer(RENDER_QUEUE).await?);
    info!(concurrency = WORKER_CONCURRENCY, "render worker started");

    let pullers = (0..WORKER_CONCURRENCY).map(|_| {
        let clients = Arc::clone(&clients);
        let consumer = Arc::clone(&consumer);
        tokio::spawn(pull_loop(consumer, clients))
    });
    futures::future::join_all(pullers).await;

    Ok(())
}

async fn pull_loop(consumer: Arc<WorkQueueConsumer>, clients: Arc<Clients>) {
    loop {
        let delivery = match consumer.next::<RenderRequest>().await {
            Ok(Some(d)) => d,
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "failed to pull next message");
                continue;
            }
        };

        let disposition = handle_render(delivery.payload.clone(), &clients).await;
        if let Err(e) = delivery.finish(disposition).await {
            error!(error = %e, "failed to ack/nack/reject message");
        }
    }
}
