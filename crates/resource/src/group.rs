//! Lazily created resources, one per executor.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use strand_executor::{EventExecutor, EventFuture, ExecutorId, Listener, listener};

use crate::error::{BoxError, Error, Result};
use crate::resource::{Resource, ResourceFactory};

/// Cache holding at most one `R` per live executor.
///
/// The first [`get_or_create`](Self::get_or_create) for an executor runs the
/// factory; later calls return the same `Arc<R>`. When the executor
/// terminates its entry is evicted and closed. [`close`](Self::close) and
/// dropping the last handle close whatever is still cached. Each resource is
/// closed exactly once, by whichever of these removes it from the table.
///
/// Cloning a group yields another handle to the same cache.
pub struct ResourceGroup<R: Resource> {
    inner: Arc<Inner<R>>,
}

struct Inner<R: Resource> {
    factory: Box<dyn ResourceFactory<R>>,
    resources: Mutex<HashMap<ExecutorId, Entry<R>>>,
}

struct Entry<R> {
    resource: Arc<R>,
    termination: EventFuture<()>,
    eviction: Listener<()>,
}

impl<R: Resource> Clone for ResourceGroup<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceGroup<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceGroup")
            .field("resources", &self.len())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceGroup<R> {
    /// Group creating resources with `factory`.
    pub fn new(factory: impl ResourceFactory<R>) -> Self {
        Self {
            inner: Arc::new(Inner {
                factory: Box::new(factory),
                resources: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Group creating resources with a closure.
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&Arc<dyn EventExecutor>) -> std::result::Result<R, BoxError> + Send + Sync + 'static,
    {
        Self::new(factory)
    }

    /// The resource bound to `executor`, created on first use.
    ///
    /// # Errors
    /// - `IllegalState` if the executor is shutting down, or terminated
    ///   while the resource was being registered
    /// - `Creation` if the factory fails; nothing is cached in that case
    pub fn get_or_create(&self, executor: &Arc<dyn EventExecutor>) -> Result<Arc<R>> {
        let id = executor.id();
        if executor.is_shutting_down() {
            return Err(Error::IllegalState { executor: id });
        }

        let (resource, termination, eviction) = {
            let mut resources = self.inner.resources.lock();
            if let Some(existing) = resources.get(&id) {
                return Ok(Arc::clone(&existing.resource));
            }
            let created = self
                .inner
                .factory
                .create(executor)
                .map_err(|source| Error::Creation {
                    executor: id,
                    source,
                })?;
            let resource = Arc::new(created);
            let termination = executor.termination_future();
            let group: Weak<Inner<R>> = Arc::downgrade(&self.inner);
            let eviction = listener(move |_: &EventFuture<()>| {
                if let Some(inner) = group.upgrade() {
                    inner.evict(id);
                }
            });
            resources.insert(
                id,
                Entry {
                    resource: Arc::clone(&resource),
                    termination: termination.clone(),
                    eviction: Arc::clone(&eviction),
                },
            );
            (resource, termination, eviction)
        };
        tracing::debug!(executor = %id, "resource created");

        termination.add_listener(eviction)?;
        if termination.is_done() {
            return Err(Error::IllegalState { executor: id });
        }
        Ok(resource)
    }

    /// Close every cached resource and empty the cache.
    ///
    /// Close failures are logged; the remaining resources are still closed.
    /// Eviction listeners are removed from the executors' termination
    /// futures. The group stays usable afterwards.
    pub fn close(&self) {
        let drained = std::mem::take(&mut *self.inner.resources.lock());
        close_all(drained);
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.inner.resources.lock().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.resources.lock().is_empty()
    }

    /// Whether a resource is cached for `executor`.
    pub fn contains(&self, executor: ExecutorId) -> bool {
        self.inner.resources.lock().contains_key(&executor)
    }
}

impl<R: Resource> Inner<R> {
    fn evict(&self, executor: ExecutorId) {
        let removed = self.resources.lock().remove(&executor);
        if let Some(entry) = removed {
            tracing::debug!(%executor, "executor terminated, evicting resource");
            close_one(executor, &entry.resource);
        }
    }
}

impl<R: Resource> Drop for Inner<R> {
    fn drop(&mut self) {
        let drained = std::mem::take(self.resources.get_mut());
        close_all(drained);
    }
}

fn close_all<R: Resource>(entries: HashMap<ExecutorId, Entry<R>>) {
    for (executor, entry) in entries {
        if let Err(e) = entry.termination.remove_listener(&entry.eviction) {
            tracing::debug!(%executor, error = %e, "could not remove eviction listener");
        }
        close_one(executor, &entry.resource);
    }
}

fn close_one<R: Resource>(executor: ExecutorId, resource: &Arc<R>) {
    if let Err(e) = resource.close() {
        tracing::warn!(%executor, error = %e, "failed to close a resource");
    }
}
