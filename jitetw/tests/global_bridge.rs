//! Process-wide bridge lifecycle. Tests share one global, so they run serially.

mod common;

use jitetw::bridge;
use jitetw::{CodeEvent, Dispatch, Emission, Settings};
use serial_test::serial;

fn noop_settings() -> Settings {
    Settings::from_toml_str("[provider]\nbackend = \"noop\"").unwrap()
}

#[test]
#[serial]
fn test_init_and_teardown() {
    common::init();
    let first = bridge::init(&noop_settings()).unwrap();
    let second = bridge::init(&noop_settings()).unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(first.provider().is_registered());
    assert_eq!(first.provider().sink_name(), "noop");

    // The no-op backend never enables anything
    let event = CodeEvent::code_added(1, 2, 3, "f");
    assert_eq!(
        bridge::on_code_event(&event),
        Dispatch::MethodLoad(Emission::Disabled)
    );

    bridge::teardown();
    assert!(!first.provider().is_registered());
    assert_eq!(bridge::on_code_event(&event), Dispatch::Unregistered);

    // Teardown twice is harmless
    bridge::teardown();
}
