//! Bounded worker pool over a shared job queue.
//!
//! All jobs are pushed into one crossbeam channel up front and a fixed number
//! of scoped worker threads drain it. A slow item only delays the worker that
//! took it; the others keep pulling. Each worker handles one job at a time.

use crossbeam::channel;

use crate::core::is_shutdown;

/// Run `work` over every job on `workers` threads, returning when the queue
/// is drained (or a shutdown was requested and in-flight jobs finished).
///
/// Jobs may borrow from the caller: workers are scoped to this call.
pub fn run_queue<J, F>(jobs: Vec<J>, workers: usize, work: F)
where
    J: Send,
    F: Fn(J) + Sync,
{
    if jobs.is_empty() {
        return;
    }

    let workers = workers.clamp(1, jobs.len());
    let (tx, rx) = channel::unbounded();
    for job in jobs {
        // Receiver is alive until the scope below ends
        let _ = tx.send(job);
    }
    drop(tx);

    let work = &work;
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let rx = rx.clone();
            scope.spawn(move || {
                while !is_shutdown() {
                    match rx.recv() {
                        Ok(job) => work(job),
                        Err(_) => break, // drained
                    }
                }
            });
        }
    });
}
