use beacon::logging::SharedLogManager;
use beacon::{BeaconConfig, ModernResolver, ResolverExt, init, locator};
use std::sync::Arc;

#[test]
fn dropping_handle_stops_default_registrations() {
    let handle = init(&BeaconConfig::default()).expect("init should succeed");

    let before_drop = Arc::new(ModernResolver::new());
    locator().set_current(before_drop.clone());
    assert!(before_drop.has_service::<SharedLogManager>(None).unwrap());

    drop(handle);

    let after_drop = Arc::new(ModernResolver::new());
    locator().set_current(after_drop.clone());
    assert!(!after_drop.has_service::<SharedLogManager>(None).unwrap());
}
