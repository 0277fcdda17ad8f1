//! Group commit demo: many threads append records through one coordinator.
//!
//! Run with: cargo run --example group_commit
//! For batch-level traces: RUST_LOG=batchwrite=trace cargo run --example group_commit

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use batchwrite::{BatchResult, BatchingWriteCoordinator, CoordinatorSettings, SpanContext};
use parking_lot::Mutex;

const WRITERS: usize = 8;
const RECORDS_PER_WRITER: usize = 500;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("records.log");
    let file = Mutex::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?,
    );

    let sink = move |records: &[String]| -> BatchResult<()> {
        let mut file = file.lock();
        for record in records {
            writeln!(file, "{record}")?;
        }
        file.sync_data()?;
        Ok(())
    };

    let coordinator = Arc::new(BatchingWriteCoordinator::with_context(
        CoordinatorSettings::new(256),
        sink,
        SpanContext,
    )?);
    let acknowledged = Arc::new(AtomicU64::new(0));
    let barrier = Arc::new(Barrier::new(WRITERS));

    println!("Appending {} records from {WRITERS} threads", WRITERS * RECORDS_PER_WRITER);

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let coordinator = Arc::clone(&coordinator);
            let acknowledged = Arc::clone(&acknowledged);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let span = tracing::info_span!("writer", writer);
                let _entered = span.enter();
                barrier.wait();
                for sequence in 0..RECORDS_PER_WRITER {
                    let acknowledged = Arc::clone(&acknowledged);
                    coordinator.submit(format!("{writer}:{sequence}"), move |outcome| {
                        match outcome {
                            Ok(()) => {
                                acknowledged.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(err) => tracing::error!(%err, sequence, "Record not durable"),
                        }
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().map_err(|_| "writer thread panicked")?;
    }

    let snapshot = coordinator.metrics().snapshot();
    println!(
        "Acknowledged {} records in {} fsyncs (avg batch {:.1}, largest {})",
        acknowledged.load(Ordering::Relaxed),
        snapshot.batches_written,
        snapshot.avg_batch_size,
        snapshot.largest_batch,
    );
    println!(
        "Write latency p50={}us p95={}us p99={}us",
        snapshot.write_p50_us, snapshot.write_p95_us, snapshot.write_p99_us
    );
    println!("Health: {}", coordinator.health().state);

    Ok(())
}
