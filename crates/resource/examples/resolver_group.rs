// Resolver group example: one resolver per executor.
//
// Starts a small executor group, resolves a host through the resolver owned
// by each member, then shuts the group down. Resolvers are evicted as their
// executors terminate; `close` releases anything still cached.

use std::sync::mpsc;
use std::time::Duration;

use strand_executor::{EventExecutorGroup, ExecutorConfig, ExecutorGroup};
use strand_resource::InetResolver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = strand_log::auto_init()?;

    let executors = ExecutorGroup::new(&ExecutorConfig::with_threads(2).thread_name_prefix("io"))?;
    let resolvers = InetResolver::group();

    // -- Resolve through each member -----------------------------------------

    for _ in 0..executors.len() {
        let executor = executors.next();
        let resolver = resolvers.get_or_create(&executor)?;
        let addrs = resolver.resolve("localhost", 8080).get()?;
        tracing::info!(executor = %executor.id(), ?addrs, "resolved");
    }
    tracing::info!(cached = resolvers.len(), "resolvers in use");

    // -- Shut down -------------------------------------------------------------

    let (tx, rx) = mpsc::channel();
    executors.shutdown_gracefully().on_complete(move |_| {
        let _ = tx.send(());
    })?;
    rx.recv_timeout(Duration::from_secs(5))?;

    resolvers.close();
    tracing::info!(cached = resolvers.len(), "executor group terminated");
    Ok(())
}
