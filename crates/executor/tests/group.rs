//! Executor groups: selection, parentage and collective termination.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use strand_executor::{
    EventExecutor, EventExecutorGroup, ExecutorChooser, ExecutorConfig, ExecutorError,
    ExecutorGroup,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn next_visits_every_member() {
    let group = ExecutorGroup::new(&ExecutorConfig::with_threads(3)).unwrap();
    assert_eq!(group.len(), 3);

    let seen: HashSet<_> = (0..3).map(|_| group.next().id()).collect();
    assert_eq!(seen.len(), 3);

    group.shutdown_gracefully().wait().unwrap();
}

#[test]
fn members_report_their_parent() {
    let group = ExecutorGroup::new(&ExecutorConfig::with_threads(2)).unwrap();
    let as_dyn: Arc<dyn EventExecutorGroup> = group.clone();
    for child in group.executors() {
        let parent = child.parent().expect("member has a parent");
        assert!(std::ptr::addr_eq(Arc::as_ptr(&parent), Arc::as_ptr(&as_dyn)));
    }
    group.shutdown_gracefully().wait().unwrap();
}

#[test]
fn group_terminates_after_every_member() {
    let group = ExecutorGroup::new(&ExecutorConfig::with_threads(4)).unwrap();
    for child in group.executors() {
        child.execute(Box::new(|| {})).unwrap();
    }
    assert!(!group.is_shutting_down());

    let termination = group.shutdown_gracefully();
    assert!(group.is_shutting_down());
    assert!(termination.wait_timeout(TIMEOUT).unwrap());
    assert!(group.is_terminated());
    assert!(group.executors().iter().all(|child| child.is_terminated()));
}

struct AlwaysFirst;

impl ExecutorChooser for AlwaysFirst {
    fn next_index(&self, _len: usize) -> usize {
        0
    }
}

#[test]
fn custom_chooser_drives_selection() {
    let group =
        ExecutorGroup::with_chooser(&ExecutorConfig::with_threads(3), Box::new(AlwaysFirst))
            .unwrap();
    let first = group.next().id();
    assert!((0..5).all(|_| group.next().id() == first));
    group.shutdown_gracefully().wait().unwrap();
}

#[test]
fn invalid_config_is_rejected() {
    let config = ExecutorConfig::with_threads(2).thread_name_prefix("");
    assert!(matches!(
        ExecutorGroup::new(&config),
        Err(ExecutorError::InvalidArgument(_))
    ));
}
