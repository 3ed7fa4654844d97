// Connection load driver
//
// Fans out `workers` independent connect -> ping -> hold -> release lifecycles
// on a dedicated thread pool, one thread per worker, and waits for all of them.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{debug, info, warn};

use crate::connector::{Connection, Connector};
use crate::descriptor::ConnectionDescriptor;
use crate::error::WorkerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub workers: NonZeroUsize,
    /// How long each connection is kept idle before closing
    pub hold: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionReport {
    /// Counts failed workers too
    pub launched: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    Held,
    ConnectFailed,
    PingFailed,
}

/// Run every worker concurrently, return once all of them are done
pub fn run<C: Connector>(
    connector: &C,
    descriptor: &ConnectionDescriptor,
    config: &RunConfig,
) -> anyhow::Result<CompletionReport> {
    let workers = config.workers.get();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("connstress-{i}"))
        .build()
        .with_context(|| format!("Can't start {workers} worker threads"))?;

    info!(
        "Opening {workers} connections to {descriptor}, holding for {:?}",
        config.hold
    );
    let chrono = Instant::now();

    // scope returns once every spawned worker has returned
    pool.scope(|s| {
        for id in 0..workers {
            s.spawn(move |_| {
                let outcome = run_worker(id, connector, descriptor, config.hold);
                debug!("Worker {id}: {outcome:?}");
            });
        }
    });

    debug!("All workers done in {:?}", chrono.elapsed());

    Ok(CompletionReport { launched: workers })
}

/// One connection lifecycle. Failures are logged, never propagated.
pub fn run_worker<C: Connector>(
    id: usize,
    connector: &C,
    descriptor: &ConnectionDescriptor,
    hold: Duration,
) -> WorkerOutcome {
    match hold_connection(id, connector, descriptor, hold) {
        Ok(()) => WorkerOutcome::Held,
        Err(e) => {
            warn!("Worker {id}: {e:#}");
            match e {
                WorkerError::Connect(_) => WorkerOutcome::ConnectFailed,
                WorkerError::Liveness(_) => WorkerOutcome::PingFailed,
            }
        }
    }
}

fn hold_connection<C: Connector>(
    id: usize,
    connector: &C,
    descriptor: &ConnectionDescriptor,
    hold: Duration,
) -> Result<(), WorkerError> {
    // dropped on every return path below
    let mut conn = connector
        .connect(descriptor)
        .map_err(WorkerError::Connect)?;

    conn.ping().map_err(WorkerError::Liveness)?;

    info!(
        "Worker {id}: Connected. Keeping connection alive for {} seconds...",
        hold.as_secs()
    );
    if !hold.is_zero() {
        std::thread::sleep(hold);
    }

    info!("Worker {id}: Closing connection.");
    drop(conn);

    Ok(())
}
