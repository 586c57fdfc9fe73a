use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct TaskQueue {
    tasks: VecDeque<Task>,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<TaskQueue>,
    cond: Condvar,
    pending: Mutex<usize>,
    finish_cond: Condvar,
}

/// Fixed pool of `N` worker threads pulling from a shared FIFO, with a
/// `pending`-task counter that lets callers block until the queue
/// drains (`finish`) without tearing the pool down, separately from a
/// terminal `shutdown`/`join`.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkQueue {
    pub fn new(size: usize) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(TaskQueue {
                tasks: VecDeque::new(),
                shutdown: false,
            }),
            cond: Condvar::new(),
            pending: Mutex::new(0),
            finish_cond: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(size);
        for _ in 0..size {
            let shared = Arc::clone(&shared);
            workers.push(thread::spawn(move || worker_loop(shared)));
        }

        WorkQueue {
            shared,
            workers: Mutex::new(workers),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Enqueues `task`, bumping `pending` before the task is visible to
    /// any worker so a concurrent `finish()` can never observe a task
    /// that has been counted but not yet enqueued.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut pending = self.shared.pending.lock().unwrap();
            *pending += 1;
        }
        let mut queue = self.shared.queue.lock().unwrap();
        queue.tasks.push_back(Box::new(task));
        self.shared.cond.notify_one();
    }

    /// Blocks until `pending == 0`. The pool keeps running; the queue
    /// stays usable afterward.
    pub fn finish(&self) {
        let pending = self.shared.pending.lock().unwrap();
        let _guard = self
            .shared
            .finish_cond
            .wait_while(pending, |p| *p != 0)
            .unwrap();
    }

    /// Marks the queue as shut down and wakes every worker. Tasks
    /// already enqueued but not yet started are abandoned. The flag and
    /// the notify happen under the same lock the workers' wait loop
    /// checks, so a worker re-evaluating its wait predicate can never
    /// miss this wakeup.
    pub fn shutdown(&self) {
        let mut queue = self.shared.queue.lock().unwrap();
        queue.shutdown = true;
        self.shared.cond.notify_all();
    }

    /// `finish()`, then `shutdown()`, then waits for every worker
    /// thread to terminate. The queue is not usable afterward.
    pub fn join(self) {
        self.finish();
        self.shutdown();
        let mut workers = self.workers.lock().unwrap();
        for worker in workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let mut queue = shared.queue.lock().unwrap();
        while queue.tasks.is_empty() && !queue.shutdown {
            queue = shared.cond.wait(queue).unwrap();
        }
        let task = queue.tasks.pop_front();
        let is_shutdown = queue.shutdown;
        drop(queue);

        let Some(task) = task else {
            if is_shutdown {
                return;
            }
            continue;
        };

        // Task panics are caught so one bad task never takes down the
        // pool; the pending count is still decremented either way.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task));

        let mut pending = shared.pending.lock().unwrap();
        *pending -= 1;
        if *pending == 0 {
            shared.finish_cond.notify_all();
        }
        drop(pending);

        if is_shutdown {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn scenario_finish_observes_all_side_effects_and_queue_stays_usable() {
        let queue = WorkQueue::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            queue.execute(move || {
                thread::sleep(Duration::from_millis(10));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), 100);

        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            queue.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), 110);

        queue.join();
    }

    #[test]
    fn size_reports_worker_count() {
        let queue = WorkQueue::new(3);
        assert_eq!(queue.size(), 3);
        queue.join();
    }

    #[test]
    fn panicking_task_does_not_wedge_pending_count() {
        let queue = WorkQueue::new(2);
        queue.execute(|| panic!("boom"));
        queue.finish();
        queue.join();
    }

    #[test]
    fn join_does_not_hang_right_after_the_last_task_completes() {
        // Regression check for the lost-wakeup window between a worker's
        // final `pending--` and it re-entering the wait loop: shutdown
        // must still reach it even if `shutdown()` runs in that gap.
        for _ in 0..20 {
            let queue = WorkQueue::new(4);
            queue.execute(|| {});
            queue.finish();
            queue.join();
        }
    }
}
