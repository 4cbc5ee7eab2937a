use beacon_locator::*;
use beacon_resolver::*;
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn resolver_with(value: &'static str) -> Arc<ModernResolver> {
    let resolver = Arc::new(ModernResolver::new());
    resolver.register_constant(value, None).unwrap();
    resolver
}

fn name_of(locator: &Locator) -> Option<&'static str> {
    locator.current().get_service::<&'static str>(None).unwrap()
}

fn counter_callback(counter: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static {
    let counter = counter.clone();
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// A registry that only supports lookups.
#[derive(Debug)]
struct ReadOnly;

impl DependencyResolver for ReadOnly {
    fn resolve(&self, _key: &ServiceKey) -> ResolverResult<Option<ServiceInstance>> {
        Ok(None)
    }

    fn resolve_all(&self, _key: &ServiceKey) -> ResolverResult<Vec<ServiceInstance>> {
        Ok(Vec::new())
    }

    fn has_registration(&self, _key: &ServiceKey) -> ResolverResult<bool> {
        Ok(false)
    }

    fn dispose(&self) {}
}

#[test]
fn test_callbacks_fire_once_per_swap_in_order() {
    let locator = Locator::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let first_log = log.clone();
    let _first = locator.register_resolver_changed_callback(move || first_log.lock().push("first"));
    let second_log = log.clone();
    let _second = locator.register_resolver_changed_callback(move || second_log.lock().push("second"));
    log.lock().clear();

    locator.set_current(resolver_with("next"));

    assert_eq!(*log.lock(), vec!["first", "second"]);
    assert_eq!(name_of(&locator), Some("next"));
}

#[test]
fn test_subscription_invokes_immediately() {
    let locator = Locator::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribed_callback_is_not_notified() {
    let locator = Locator::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let sub = locator.register_resolver_changed_callback(counter_callback(&calls));
    sub.unsubscribe();
    locator.set_current(Arc::new(ModernResolver::new()));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_suppressed_swaps_are_dropped() {
    let locator = Locator::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));

    {
        let _guard = locator.suppress_resolver_changed_notifications();
        assert!(!locator.are_notifications_enabled());
        locator.set_current(resolver_with("quiet"));
        locator.set_current(resolver_with("quieter"));
    }

    assert!(locator.are_notifications_enabled());
    assert_eq!(calls.load(Ordering::SeqCst), 1, "suppressed swaps must not be replayed");
    assert_eq!(name_of(&locator), Some("quieter"));

    locator.set_current(resolver_with("loud"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_nested_suppression_requires_every_guard() {
    let locator = Locator::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));

    let outer = locator.suppress_resolver_changed_notifications();
    let mut inner = locator.suppress_resolver_changed_notifications();

    inner.release();
    inner.release();
    assert!(!locator.are_notifications_enabled());
    locator.set_current(Arc::new(ModernResolver::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    drop(inner);
    drop(outer);
    assert!(locator.are_notifications_enabled());
    locator.set_current(Arc::new(ModernResolver::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_subscribing_while_suppressed_skips_initial_call() {
    let locator = Locator::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let guard = locator.suppress_resolver_changed_notifications();
    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));
    drop(guard);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_current_mutable_unavailable_for_read_only_resolver() {
    let locator = Locator::new();
    assert!(locator.current_mutable().is_some());

    locator.set_current(Arc::new(ReadOnly));
    assert!(locator.current_mutable().is_none());
    assert_eq!(locator.current().get_service::<u8>(None).unwrap(), None);

    locator.set_current_mutable(Arc::new(ModernResolver::new()));
    assert!(locator.current_mutable().is_some());
}

#[test]
fn test_with_resolver_restores_previous() {
    let locator = Locator::from_resolver(resolver_with("original"));
    let calls = Arc::new(AtomicUsize::new(0));
    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));

    {
        let scope = locator.with_resolver(resolver_with("temporary"), false);
        assert_eq!(name_of(&locator), Some("temporary"));
        assert!(scope.previous().is_some());
    }

    assert_eq!(name_of(&locator), Some("original"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_with_resolver_can_suppress_notifications() {
    let locator = Locator::from_resolver(resolver_with("original"));
    let calls = Arc::new(AtomicUsize::new(0));
    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));

    {
        let _scope = locator.with_resolver(resolver_with("temporary"), true);
        assert!(!locator.are_notifications_enabled());
    }

    assert!(locator.are_notifications_enabled());
    assert_eq!(name_of(&locator), Some("original"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_scope_does_not_touch_original_registry() {
    let original = resolver_with("base");
    let locator = Locator::from_resolver(original.clone());

    let fork = Arc::new(original.duplicate().unwrap());
    fork.register_constant("forked", None).unwrap();
    {
        let _scope = locator.with_resolver(fork, true);
        assert_eq!(name_of(&locator), Some("forked"));
    }

    assert_eq!(original.get_services::<&'static str>(None).unwrap(), vec!["base"]);
}

#[test]
fn test_isolated_override_stays_in_context() {
    let locator = Locator::from_resolver(resolver_with("shared"));
    assert!(!in_test_context());

    isolated(|| {
        assert!(in_test_context());
        assert_eq!(name_of(&locator), Some("shared"));

        locator.set_current(resolver_with("isolated"));
        assert_eq!(name_of(&locator), Some("isolated"));

        std::thread::scope(|s| {
            s.spawn(|| assert_eq!(name_of(&locator), Some("shared")));
        });

        isolated(|| {
            assert_eq!(name_of(&locator), Some("isolated"), "nested context inherits");
            locator.set_current(resolver_with("nested"));
        });
        assert_eq!(name_of(&locator), Some("isolated"));
    });

    assert_eq!(name_of(&locator), Some("shared"));
}

#[test]
fn test_isolated_override_is_per_locator() {
    let first = Locator::from_resolver(resolver_with("first"));
    let second = Locator::from_resolver(resolver_with("second"));

    isolated(|| {
        first.set_current(resolver_with("override"));
        assert_eq!(name_of(&first), Some("override"));
        assert_eq!(name_of(&second), Some("second"));
    });
}

#[test]
fn test_isolated_swaps_still_notify() {
    let locator = Locator::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _sub = locator.register_resolver_changed_callback(counter_callback(&calls));

    isolated(|| locator.set_current(Arc::new(ModernResolver::new())));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_contexts_do_not_see_each_other() {
    let locator = Arc::new(Locator::from_resolver(resolver_with("shared")));

    let tasks = ["alpha", "beta", "gamma"].map(|name| {
        let locator = locator.clone();
        tokio::spawn(isolated_async(async move {
            locator.set_current(resolver_with(name));
            tokio::time::sleep(Duration::from_millis(10)).await;
            tokio::task::yield_now().await;
            name_of(&locator)
        }))
    });

    for (task, expected) in tasks.into_iter().zip(["alpha", "beta", "gamma"]) {
        assert_eq!(task.await.unwrap(), Some(expected));
    }
    assert_eq!(name_of(&locator), Some("shared"));
}

#[test]
#[serial]
fn test_global_locator_isolation() {
    let before = locator().current();

    isolated(|| {
        locator().set_current(resolver_with("global-test"));
        assert_eq!(name_of(locator()), Some("global-test"));
    });

    assert!(Arc::ptr_eq(&before, &locator().current()));
}

/// Reads the locator back while being dropped.
#[derive(Debug)]
struct ReadsLocatorOnDrop {
    locator: &'static Locator,
    drops: Arc<AtomicUsize>,
}

impl DependencyResolver for ReadsLocatorOnDrop {
    fn resolve(&self, _key: &ServiceKey) -> ResolverResult<Option<ServiceInstance>> {
        Ok(None)
    }

    fn resolve_all(&self, _key: &ServiceKey) -> ResolverResult<Vec<ServiceInstance>> {
        Ok(Vec::new())
    }

    fn has_registration(&self, _key: &ServiceKey) -> ResolverResult<bool> {
        Ok(false)
    }

    fn dispose(&self) {}
}

impl Drop for ReadsLocatorOnDrop {
    fn drop(&mut self) {
        let _current = self.locator.current();
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_replaced_override_may_read_locator_while_dropping() {
    let locator: &'static Locator = Box::leak(Box::new(Locator::new()));
    let drops = Arc::new(AtomicUsize::new(0));

    isolated(|| {
        locator.set_current(Arc::new(ReadsLocatorOnDrop { locator, drops: drops.clone() }));
        locator.set_current(resolver_with("replacement"));

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(name_of(locator), Some("replacement"));
    });
}
