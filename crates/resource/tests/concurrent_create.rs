//! Concurrent `get_or_create` calls for one executor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use strand_executor::{EventExecutor, ExecutorExt, SingleThreadExecutor};
use strand_resource::{BoxError, Resource, ResourceGroup};

const THREADS: usize = 16;

#[derive(Debug)]
struct Slot(u64);

impl Resource for Slot {
    fn close(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[test]
fn concurrent_callers_share_one_creation() {
    let _ = strand_log::init_test();
    let created = Arc::new(AtomicU64::new(0));
    let group = {
        let created = Arc::clone(&created);
        ResourceGroup::from_fn(move |_| {
            let nth = created.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(5));
            Ok(Slot(nth))
        })
    };
    let executor: Arc<dyn EventExecutor> = SingleThreadExecutor::new("contended");
    executor.submit(|| ()).get().unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let group = group.clone();
            let executor = Arc::clone(&executor);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                group.get_or_create(&executor).unwrap()
            })
        })
        .collect();
    let seen: Vec<Arc<Slot>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(seen.iter().all(|slot| Arc::ptr_eq(slot, &seen[0])));
    assert_eq!(seen[0].0, 0);

    executor.shutdown_gracefully().wait().unwrap();
}

#[test]
fn creation_for_different_executors_is_serialized_but_distinct() {
    let group = ResourceGroup::from_fn(|executor| Ok(Slot(executor.id().as_u64())));
    let executors: Vec<Arc<dyn EventExecutor>> = (0..4)
        .map(|i| -> Arc<dyn EventExecutor> { SingleThreadExecutor::new(format!("spread-{i}")) })
        .collect();

    let handles: Vec<_> = executors
        .iter()
        .map(|executor| {
            let group = group.clone();
            let executor = Arc::clone(executor);
            thread::spawn(move || group.get_or_create(&executor).unwrap())
        })
        .collect();
    let slots: Vec<Arc<Slot>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(group.len(), executors.len());
    for (slot, executor) in slots.iter().zip(&executors) {
        assert_eq!(slot.0, executor.id().as_u64());
    }

    for executor in &executors {
        executor.shutdown_gracefully();
    }
    assert!(group.is_empty());
}
