//! Fire-once deferred tasks with cancellation.
//!
//! Two implementations share the [`Scheduler`] trait:
//! - [`ThreadScheduler`]: wall-clock timers on a dedicated worker thread
//! - [`ManualScheduler`]: a virtual clock advanced explicitly (tests, offline hosts)

use crate::lockfree::AtomicFlag;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay unless its handle is cancelled first.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

/// Cancellation token for a scheduled task.
///
/// Clones share the same flag. A cancelled task is never run; cancelling a task
/// that already ran has no effect.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicFlag>,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicFlag::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Pending<T> {
    due: T,
    seq: u64,
    handle: TaskHandle,
    task: Task,
}

impl<T> Pending<T> {
    fn run(self) -> bool {
        if self.handle.is_cancelled() {
            return false;
        }
        if catch_unwind(AssertUnwindSafe(self.task)).is_err() {
            warn!("scheduled task panicked");
        }
        true
    }
}

/// Deadline-ordered queue; ties fire in scheduling order.
struct TaskQueue<T> {
    pending: Vec<Pending<T>>,
    next_seq: u64,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T: Ord + Copy> TaskQueue<T> {
    fn push(&mut self, due: T, handle: TaskHandle, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self
            .pending
            .partition_point(|p| (p.due, p.seq) <= (due, seq));
        self.pending.insert(
            at,
            Pending {
                due,
                seq,
                handle,
                task,
            },
        );
    }

    fn next_due(&self) -> Option<T> {
        self.pending.first().map(|p| p.due)
    }

    fn pop_due(&mut self, now: T) -> Option<Pending<T>> {
        match self.pending.first() {
            Some(p) if p.due <= now => Some(self.pending.remove(0)),
            _ => None,
        }
    }

    fn live(&self) -> usize {
        self.pending
            .iter()
            .filter(|p| !p.handle.is_cancelled())
            .count()
    }
}

enum Command {
    Schedule {
        due: Instant,
        handle: TaskHandle,
        task: Task,
    },
    Shutdown,
}

/// Wall-clock scheduler backed by one worker thread.
///
/// Tasks run on the worker thread. Dropping the scheduler stops the worker and
/// discards anything that has not fired yet.
pub struct ThreadScheduler {
    sender: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadScheduler {
    pub fn new() -> Result<Self> {
        let (sender, receiver) = unbounded();
        let worker = thread::Builder::new()
            .name("panora-scheduler".into())
            .spawn(move || Self::worker_loop(receiver))?;

        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }

    fn worker_loop(receiver: Receiver<Command>) {
        let mut queue = TaskQueue::<Instant>::default();

        loop {
            let command = match queue.next_due() {
                Some(due) => {
                    match receiver.recv_timeout(due.saturating_duration_since(Instant::now())) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match receiver.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };

            match command {
                Some(Command::Schedule { due, handle, task }) => queue.push(due, handle, task),
                Some(Command::Shutdown) => break,
                None => {}
            }

            let now = Instant::now();
            while let Some(pending) = queue.pop_due(now) {
                pending.run();
            }
        }

        debug!(discarded = queue.live(), "scheduler worker stopped");
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let Some(due) = Instant::now().checked_add(delay) else {
            warn!(?delay, "delay past the end of the clock, task will never run");
            handle.cancel();
            return handle;
        };
        let command = Command::Schedule {
            due,
            handle: handle.clone(),
            task,
        };

        if self.sender.send(command).is_err() {
            warn!("scheduler worker is gone, task dropped");
            handle.cancel();
        }

        handle
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    queue: TaskQueue<Duration>,
}

/// Scheduler driven by an explicit virtual clock.
///
/// Nothing fires until [`advance`](ManualScheduler::advance) moves the clock
/// past a task's deadline; tasks then run on the calling thread in deadline
/// order. Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Tasks scheduled and not cancelled that have not fired yet.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.live()
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Returns the number of tasks that ran. Tasks may schedule further tasks;
    /// those fire within the same call if they fall due before the new time.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now.saturating_add(by);
        let mut fired = 0;

        loop {
            let next = {
                let mut state = self.state.lock();
                match state.queue.pop_due(target) {
                    Some(pending) => {
                        state.now = state.now.max(pending.due);
                        pending
                    }
                    None => {
                        state.now = target;
                        break;
                    }
                }
            };

            // Lock released: the task may call back into the scheduler
            if next.run() {
                fired += 1;
            }
        }

        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut state = self.state.lock();
        let Some(due) = state.now.checked_add(delay) else {
            warn!(?delay, "delay past the end of the clock, task will never run");
            handle.cancel();
            return handle;
        };
        state.queue.push(due, handle.clone(), task);
        handle
    }
}
