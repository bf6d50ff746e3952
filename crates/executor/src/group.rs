//! Groups of executors

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use crate::chooser::{ExecutorChooser, default_chooser};
use crate::config::ExecutorConfig;
use crate::error::Result;
use crate::executor::EventExecutor;
use crate::future::{EventFuture, Promise};
use crate::single_thread::SingleThreadExecutor;

/// A collection of executors handed out through [`next`](Self::next).
pub trait EventExecutorGroup: Send + Sync + 'static {
    /// Pick one member executor.
    fn next(&self) -> Arc<dyn EventExecutor>;

    /// All member executors.
    fn executors(&self) -> Vec<Arc<dyn EventExecutor>>;

    /// Whether every member stopped accepting work.
    fn is_shutting_down(&self) -> bool;

    /// Whether every member terminated.
    fn is_terminated(&self) -> bool {
        self.termination_future().is_done()
    }

    /// Shut down every member; returns the group termination future.
    fn shutdown_gracefully(&self) -> EventFuture<()>;

    /// Succeeds once every member has terminated.
    fn termination_future(&self) -> EventFuture<()>;
}

/// Fixed-size group of [`SingleThreadExecutor`]s.
pub struct ExecutorGroup {
    children: Vec<Arc<dyn EventExecutor>>,
    chooser: Box<dyn ExecutorChooser>,
    termination: Promise<()>,
}

impl fmt::Debug for ExecutorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorGroup")
            .field("size", &self.children.len())
            .field("termination", &self.termination)
            .finish_non_exhaustive()
    }
}

impl ExecutorGroup {
    /// Start a group using the default chooser for its size.
    pub fn new(config: &ExecutorConfig) -> Result<Arc<Self>> {
        Self::with_chooser(config, default_chooser(config.resolved_threads()))
    }

    /// Start a group that picks members with `chooser`.
    pub fn with_chooser(
        config: &ExecutorConfig,
        chooser: Box<dyn ExecutorChooser>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let size = config.resolved_threads();

        let group = Arc::new_cyclic(|this: &Weak<Self>| {
            let parent: Weak<dyn EventExecutorGroup> = this.clone();
            let children = (0..size)
                .map(|idx| {
                    let name = format!("{}-{idx}", config.thread_name_prefix);
                    let child: Arc<dyn EventExecutor> =
                        SingleThreadExecutor::with_parent(name, parent.clone());
                    child
                })
                .collect();
            Self {
                children,
                chooser,
                termination: Promise::new(),
            }
        });

        let remaining = Arc::new(AtomicUsize::new(size));
        for child in &group.children {
            let remaining = Arc::clone(&remaining);
            let termination = group.termination.clone();
            child.termination_future().on_complete(move |_| {
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    termination.try_success(());
                }
            })?;
        }

        tracing::debug!(size, prefix = %config.thread_name_prefix, "executor group created");
        Ok(group)
    }

    /// Number of member executors.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl EventExecutorGroup for ExecutorGroup {
    fn next(&self) -> Arc<dyn EventExecutor> {
        let idx = self.chooser.next_index(self.children.len());
        Arc::clone(&self.children[idx])
    }

    fn executors(&self) -> Vec<Arc<dyn EventExecutor>> {
        self.children.clone()
    }

    fn is_shutting_down(&self) -> bool {
        self.children.iter().all(|child| child.is_shutting_down())
    }

    fn shutdown_gracefully(&self) -> EventFuture<()> {
        for child in &self.children {
            child.shutdown_gracefully();
        }
        self.termination.future()
    }

    fn termination_future(&self) -> EventFuture<()> {
        self.termination.future()
    }
}
