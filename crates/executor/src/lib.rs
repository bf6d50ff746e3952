//! # Strand Executor
//!
//! Completion futures bound to single-threaded event executors.
//!
//! - [`Promise`] / [`EventFuture`]: write and read sides of an asynchronous
//!   operation, with ordered exactly-once listeners and blocking waits that
//!   refuse to deadlock their own executor.
//! - [`EventExecutor`]: a task-running unit with thread affinity queries and a
//!   termination future; [`SingleThreadExecutor`] is the thread-backed one.
//! - [`EventExecutorGroup`]: a set of executors handed out by an
//!   [`ExecutorChooser`]; [`ExecutorGroup`] is the thread-backed one.
//!
//! ```no_run
//! use strand_executor::{EventExecutor, ExecutorExt, SingleThreadExecutor};
//!
//! let executor = SingleThreadExecutor::new("worker");
//! let answer = executor.submit(|| 6 * 7);
//! assert_eq!(answer.get().unwrap(), 42);
//! executor.shutdown_gracefully().wait().unwrap();
//! ```

pub mod chooser;
pub mod config;
pub mod error;
pub mod executor;
pub mod future;
pub mod group;
pub mod listener;
pub mod progressive;
pub mod single_thread;

pub use chooser::{ExecutorChooser, PowerOfTwoChooser, RoundRobinChooser, default_chooser};
pub use config::ExecutorConfig;
pub use error::{Cause, ExecutorError, Result};
pub use executor::{EventExecutor, ExecutorExt, ExecutorId, Task};
pub use future::{Completion, EventFuture, Promise};
pub use group::{EventExecutorGroup, ExecutorGroup};
pub use listener::{
    FutureListener, Listener, ProgressListener, SharedProgressListener, listener,
};
pub use progressive::ProgressivePromise;
pub use single_thread::SingleThreadExecutor;
