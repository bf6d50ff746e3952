//! Address resolution bound to an executor

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use strand_executor::{EventExecutor, EventFuture, ExecutorError, ExecutorExt};

use crate::error::BoxError;
use crate::group::ResourceGroup;
use crate::resource::Resource;

/// Resolves host names with the system resolver on its executor's thread.
pub struct InetResolver {
    executor: Arc<dyn EventExecutor>,
    closed: AtomicBool,
}

impl fmt::Debug for InetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InetResolver")
            .field("executor", &self.executor.id())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl InetResolver {
    /// Resolver running lookups on `executor`.
    pub fn new(executor: Arc<dyn EventExecutor>) -> Self {
        Self {
            executor,
            closed: AtomicBool::new(false),
        }
    }

    /// A group holding one resolver per executor.
    pub fn group() -> ResourceGroup<Self> {
        ResourceGroup::from_fn(|executor| Ok(Self::new(Arc::clone(executor))))
    }

    /// The executor lookups run on.
    pub fn executor(&self) -> &Arc<dyn EventExecutor> {
        &self.executor
    }

    /// Whether [`close`](Resource::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolve `host:port` into socket addresses.
    ///
    /// The returned future fails with `IllegalState` once the resolver is
    /// closed, with `Rejected` when the executor no longer accepts tasks,
    /// and with the underlying I/O error when the lookup fails.
    pub fn resolve(&self, host: &str, port: u16) -> EventFuture<Vec<SocketAddr>> {
        if self.is_closed() {
            let cause = ExecutorError::illegal_state("resolver is closed").into_cause();
            return self.executor.new_failed_future(cause);
        }

        let promise = self.executor.new_promise::<Vec<SocketAddr>>();
        let task_promise = promise.clone();
        let host = host.to_owned();
        let lookup = Box::new(move || match (host.as_str(), port).to_socket_addrs() {
            Ok(addrs) => {
                task_promise.try_success(addrs.collect());
            }
            Err(e) => {
                tracing::debug!(%host, port, error = %e, "address lookup failed");
                task_promise.try_failure(Arc::new(e));
            }
        });
        if let Err(e) = self.executor.execute(lookup) {
            promise.try_failure(e.into_cause());
        }
        promise.future()
    }
}

impl Resource for InetResolver {
    fn close(&self) -> Result<(), BoxError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err("resolver closed twice".into());
        }
        tracing::debug!(executor = %self.executor.id(), "resolver closed");
        Ok(())
    }
}
