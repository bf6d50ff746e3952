//! Resource and factory traits

use std::sync::Arc;

use strand_executor::EventExecutor;

use crate::error::BoxError;

/// A value owned by a [`ResourceGroup`](crate::ResourceGroup) on behalf of one executor.
pub trait Resource: Send + Sync + 'static {
    /// Release whatever the resource holds.
    ///
    /// Called exactly once by the group that created it.
    fn close(&self) -> Result<(), BoxError>;
}

/// Creates the resource for one executor.
///
/// Closures of the shape `Fn(&Arc<dyn EventExecutor>) -> Result<R, BoxError>`
/// implement this trait; pass them through
/// [`ResourceGroup::from_fn`](crate::ResourceGroup::from_fn).
pub trait ResourceFactory<R>: Send + Sync + 'static {
    /// Build a new resource bound to `executor`.
    fn create(&self, executor: &Arc<dyn EventExecutor>) -> Result<R, BoxError>;
}

impl<R, F> ResourceFactory<R> for F
where
    F: Fn(&Arc<dyn EventExecutor>) -> Result<R, BoxError> + Send + Sync + 'static,
{
    fn create(&self, executor: &Arc<dyn EventExecutor>) -> Result<R, BoxError> {
        self(executor)
    }
}
