use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tracing::debug;

type ExecutionFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A job id paired with its execution future, consumed exactly once
/// between enqueue and dispatch.
struct QueueEntry {
    job_id: String,
    execution: ExecutionFuture,
}

struct SchedulerState {
    queue: VecDeque<QueueEntry>,
    running: usize,
}

/// FIFO queue with a fixed concurrency ceiling. Executions are admitted
/// until `limit` are in flight; each completion frees a slot and wakes
/// the dispatch loop, which is the only re-entry point.
///
/// The scheduler only tracks completion-vs-pending. Execution futures
/// record their own success or failure into the [`JobStore`](super::JobStore)
/// before returning; nothing here is retried or re-queued.
pub struct Scheduler {
    limit: usize,
    state: Mutex<SchedulerState>,
    wake: Notify,
}

impl Scheduler {
    /// Create the scheduler and start its dispatch loop.
    pub fn new(limit: usize) -> Arc<Self> {
        let scheduler = Arc::new(Self {
            limit: limit.max(1),
            state: Mutex::new(SchedulerState {
                queue: VecDeque::new(),
                running: 0,
            }),
            wake: Notify::new(),
        });

        let dispatcher = Arc::clone(&scheduler);
        tokio::spawn(async move {
            loop {
                dispatcher.clone().dispatch_pass().await;
                dispatcher.wake.notified().await;
            }
        });

        scheduler
    }

    /// Append an execution to the queue. Never rejects; the entry waits
    /// for a free slot in FIFO order.
    pub async fn enqueue<F>(&self, job_id: impl Into<String>, execution: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let entry = QueueEntry {
            job_id: job_id.into(),
            execution: Box::pin(execution),
        };
        {
            let mut state = self.state.lock().await;
            state.queue.push_back(entry);
        }
        self.wake.notify_one();
    }

    pub async fn running(&self) -> usize {
        self.state.lock().await.running
    }

    pub async fn queued(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    // Queue and running counter share one critical section; the pass
    // admits head entries until the ceiling is reached.
    async fn dispatch_pass(self: Arc<Self>) {
        loop {
            let entry = {
                let mut state = self.state.lock().await;
                if state.running >= self.limit {
                    return;
                }
                match state.queue.pop_front() {
                    Some(entry) => {
                        state.running += 1;
                        entry
                    }
                    None => return,
                }
            };

            debug!("Dispatching job {}", entry.job_id);
            let scheduler = Arc::clone(&self);
            tokio::spawn(async move {
                entry.execution.await;
                {
                    let mut state = scheduler.state.lock().await;
                    state.running -= 1;
                }
                scheduler.wake.notify_one();
            });
        }
    }
}
