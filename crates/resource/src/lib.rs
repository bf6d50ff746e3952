//! # Strand Resource
//!
//! Resources that belong to one executor each.
//!
//! A [`ResourceGroup`] creates a resource the first time an executor asks for
//! it, hands the same instance back afterwards, and closes it when the
//! executor terminates. [`InetResolver`] is the resource kind shipped here: a
//! host name resolver running its lookups on the executor it belongs to.
//!
//! ```no_run
//! use std::sync::Arc;
//! use strand_executor::{EventExecutor, SingleThreadExecutor};
//! use strand_resource::InetResolver;
//!
//! let resolvers = InetResolver::group();
//! let executor: Arc<dyn EventExecutor> = SingleThreadExecutor::new("io");
//! let resolver = resolvers.get_or_create(&executor).unwrap();
//! let addrs = resolver.resolve("localhost", 80).get().unwrap();
//! println!("{addrs:?}");
//! ```

pub mod error;
pub mod group;
pub mod resolver;
pub mod resource;

pub use error::{BoxError, Error, Result};
pub use group::ResourceGroup;
pub use resolver::InetResolver;
pub use resource::{Resource, ResourceFactory};
