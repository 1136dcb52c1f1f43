use std::io;
use std::sync::Arc;

use taskpool::driver::{self, ConsoleObserver};
use taskpool::{PoolConfig, PoolObserver};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    let observers: Vec<Arc<dyn PoolObserver>> = vec![Arc::new(ConsoleObserver::stdout())];
    if let Err(err) = driver::run(PoolConfig::default(), observers, &mut io::stdout()) {
        tracing::error!(%err, "worker pool did not run");
    }
}
