use beacon::{BeaconConfig, BeaconError, DependencyResolver, init, locator};

#[test]
fn init_reports_disposed_resolver() {
    locator().current().dispose();

    let err = init(&BeaconConfig::default()).expect_err("disposed resolver must fail init");

    assert!(matches!(err, BeaconError::Resolver { .. }), "unexpected: {err}");
    assert!(err.to_string().contains("Failed to register default services"), "unexpected: {err}");
}
