use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pacer::config::{self, Config};
use pacer::{LimitObserver, Limiter, MetricsObserver, TracingObserver};

/// Pace calls by a minimum interval or a request rate.
#[derive(Parser, Debug)]
#[command(name = "pacer", version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run this many no-op calls through the configured limiter
    #[arg(long, default_value_t = 0)]
    calls: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(config.logging.level.parse()?)
                .from_env_lossy(),
        )
        .init();

    println!("pacer {}: call pacing by interval or rate", env!("CARGO_PKG_VERSION"));

    if args.calls == 0 {
        return Ok(());
    }

    let metrics = if config.metrics.enabled {
        Some(Arc::new(MetricsObserver::new()?))
    } else {
        None
    };
    let observer: Arc<dyn LimitObserver> = match &metrics {
        Some(metrics) => Arc::new((TracingObserver, metrics.clone())),
        None => Arc::new(TracingObserver),
    };

    let strategy = config.limiter.build();
    info!(strategy = %strategy, calls = args.calls, "Starting paced calls");
    let mut limiter = Limiter::with_observer(strategy, observer);

    let start = Instant::now();
    for call in 0..args.calls {
        limiter
            .limit_async(|| async move {
                info!(call, elapsed_ms = start.elapsed().as_millis() as u64, "Call");
            })
            .await;
    }

    let stats = limiter.stats();
    info!(
        total_delay_ms = stats.total_delay.as_millis() as u64,
        total_requests = stats.total_requests,
        average_delay_ms = stats.average_delay().as_millis() as u64,
        "Finished paced calls"
    );
    println!("{stats}");

    if let Some(metrics) = metrics {
        match metrics.gather() {
            Ok(text) => print!("{text}"),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
    }

    Ok(())
}
