//! Thread-backed executor running tasks one at a time.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::error::{ExecutorError, Result, panic_message};
use crate::executor::{EventExecutor, ExecutorId, Task};
use crate::future::{EventFuture, Promise};
use crate::group::EventExecutorGroup;

const NOT_STARTED: u8 = 1;
const STARTED: u8 = 2;
const SHUTTING_DOWN: u8 = 3;
const TERMINATED: u8 = 4;

enum Message {
    Run(Task),
    Shutdown,
}

/// Both channel ends; state transitions and sends happen under its lock.
struct Queue {
    sender: Option<Sender<Message>>,
    receiver: Option<Receiver<Message>>,
}

/// Executor backed by one lazily started OS thread.
///
/// The thread is spawned by the first [`execute`](EventExecutor::execute).
/// Shutdown drains every task queued before it, then completes the
/// termination future on the executor thread. A task accepted by `execute`
/// either runs or, if the thread could not be spawned, is dropped.
pub struct SingleThreadExecutor {
    id: ExecutorId,
    name: String,
    parent: Option<Weak<dyn EventExecutorGroup>>,
    this: Weak<SingleThreadExecutor>,
    state: AtomicU8,
    thread: OnceLock<ThreadId>,
    queue: Mutex<Queue>,
    termination: Promise<()>,
}

impl fmt::Debug for SingleThreadExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleThreadExecutor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state.load(Ordering::Acquire))
            .field("thread", &self.thread.get())
            .finish_non_exhaustive()
    }
}

impl SingleThreadExecutor {
    /// Create a standalone executor; its thread is named `name`.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::build(name.into(), None)
    }

    pub(crate) fn with_parent(name: String, parent: Weak<dyn EventExecutorGroup>) -> Arc<Self> {
        Self::build(name, Some(parent))
    }

    fn build(name: String, parent: Option<Weak<dyn EventExecutorGroup>>) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let owner: Weak<dyn EventExecutor> = this.clone();
            let (sender, receiver) = channel::unbounded();
            Self {
                id: ExecutorId::next(),
                name,
                parent,
                this: this.clone(),
                state: AtomicU8::new(NOT_STARTED),
                thread: OnceLock::new(),
                queue: Mutex::new(Queue {
                    sender: Some(sender),
                    receiver: Some(receiver),
                }),
                termination: Promise::with_executor(owner),
            }
        })
    }

    /// Thread name of this executor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tasks waiting in the queue.
    pub fn pending_tasks(&self) -> usize {
        self.queue.lock().sender.as_ref().map_or(0, Sender::len)
    }

    fn start_thread(&self, receiver: Receiver<Message>) -> Result<()> {
        let Some(this) = self.this.upgrade() else {
            return Err(ExecutorError::illegal_state("executor dropped"));
        };

        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || this.run(receiver));
        match spawned {
            Ok(handle) => {
                let _ = self.thread.set(handle.thread().id());
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    executor = %self.id,
                    error = %e,
                    "failed to spawn event loop thread"
                );
                // queued tasks went down with the closure
                self.queue.lock().sender = None;
                self.state.store(TERMINATED, Ordering::Release);
                self.termination.try_success(());
                Err(ExecutorError::Spawn(e))
            }
        }
    }

    fn run(self: Arc<Self>, receiver: Receiver<Message>) {
        let _ = self.thread.set(thread::current().id());
        let span = tracing::debug_span!("event_loop", executor = %self.id, name = %self.name);
        let _entered = span.enter();
        tracing::debug!("event loop started");

        for message in &receiver {
            match message {
                Message::Run(task) => self.run_task(task),
                Message::Shutdown => break,
            }
        }
        loop {
            match receiver.try_recv() {
                Ok(Message::Run(task)) => self.run_task(task),
                Ok(Message::Shutdown) => {}
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        self.state.store(TERMINATED, Ordering::Release);
        tracing::debug!("event loop terminated");
        self.termination.try_success(());
    }

    fn run_task(&self, task: Task) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
            tracing::error!(
                executor = %self.id,
                panic = %panic_message(payload.as_ref()),
                "task raised a panic; continuing"
            );
        }
    }
}

impl EventExecutor for SingleThreadExecutor {
    fn id(&self) -> ExecutorId {
        self.id
    }

    fn parent(&self) -> Option<Arc<dyn EventExecutorGroup>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    fn in_event_loop_thread(&self, thread: ThreadId) -> bool {
        self.thread.get() == Some(&thread)
    }

    fn is_shutting_down(&self) -> bool {
        self.state.load(Ordering::Acquire) >= SHUTTING_DOWN
    }

    fn execute(&self, task: Task) -> Result<()> {
        let (sent, receiver) = {
            let mut queue = self.queue.lock();
            let state = self.state.load(Ordering::Acquire);
            let Some(sender) = queue.sender.as_ref().filter(|_| state < SHUTTING_DOWN) else {
                return Err(ExecutorError::Rejected { executor: self.id });
            };
            let sent = sender.send(Message::Run(task));
            let receiver = if sent.is_ok() && state == NOT_STARTED {
                self.state.store(STARTED, Ordering::Release);
                queue.receiver.take()
            } else {
                None
            };
            (sent, receiver)
        };
        // a refused task is dropped here, outside the queue lock
        if sent.is_err() {
            return Err(ExecutorError::Rejected { executor: self.id });
        }
        match receiver {
            Some(receiver) => self.start_thread(receiver),
            None => Ok(()),
        }
    }

    fn shutdown_gracefully(&self) -> EventFuture<()> {
        let mut queue = self.queue.lock();
        match self.state.load(Ordering::Acquire) {
            NOT_STARTED => {
                self.state.store(TERMINATED, Ordering::Release);
                queue.sender = None;
                queue.receiver = None;
                drop(queue);
                tracing::debug!(executor = %self.id, "executor terminated before start");
                self.termination.try_success(());
            }
            STARTED => {
                self.state.store(SHUTTING_DOWN, Ordering::Release);
                if let Some(sender) = queue.sender.take() {
                    let _ = sender.send(Message::Shutdown);
                }
                drop(queue);
                tracing::debug!(executor = %self.id, "executor shutting down");
            }
            _ => {}
        }
        self.termination.future()
    }

    fn termination_future(&self) -> EventFuture<()> {
        self.termination.future()
    }

    fn downgrade(&self) -> Weak<dyn EventExecutor> {
        self.this.clone()
    }
}
