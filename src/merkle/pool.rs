//! Fixed-size worker pool backing the parallel tree build
//!
//! Workers are long-lived for the duration of one build; a sentinel task
//! terminates them cleanly when the pool is dropped. Per-level barriers are
//! implemented by the caller draining a result channel, so the pool itself
//! carries no synchronization state.

use crossbeam_channel::{unbounded, Sender};
use std::thread::JoinHandle;

enum Task {
    Run(Box<dyn FnOnce() + Send>),
    Stop,
}

/// Pool of long-lived worker threads fed through a shared task channel
pub struct WorkerPool {
    task_tx: Sender<Task>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads waiting on the task channel
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (task_tx, task_rx) = unbounded::<Task>();

        let handles = (0..workers)
            .map(|_| {
                let rx = task_rx.clone();
                std::thread::spawn(move || {
                    while let Ok(task) = rx.recv() {
                        match task {
                            Task::Run(job) => job(),
                            Task::Stop => break,
                        }
                    }
                })
            })
            .collect();

        Self { task_tx, handles }
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Queue a job; it runs on the first idle worker
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        // The channel only closes once the pool is dropped, so this send
        // cannot fail while `self` is alive.
        let _ = self.task_tx.send(Task::Run(Box::new(job)));
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for _ in &self.handles {
            let _ = self.task_tx.send(Task::Stop);
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
