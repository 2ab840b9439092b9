//! SortScope Visualization Server
//!
//! Generate a sequence and serve the animation API.

use std::env;

use sortscope_engine::VisualizerConfig;
use sortscope_vis::VisServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sortscope_vis=info,sortscope_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let defaults = VisualizerConfig::default();
    let size: usize = args.get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.size);

    let port: u16 = args.get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    let config = VisualizerConfig { size, ..defaults };
    let server = VisServer::new(config)?;

    tracing::info!(
        size = server.visualizer().len(),
        tempo = server.visualizer().tempo(),
        "sequence generated"
    );
    println!("SortScope");
    println!("=========");
    println!();
    println!("Serving {} bars on http://localhost:{}", size, port);
    println!("Stream frames from ws://localhost:{}/ws", port);
    println!();

    server.serve(port).await?;

    Ok(())
}
