// Integration tests for the pre-navigation injector
//
// The ordering guarantee is load-bearing: the override only helps if it
// runs before the document's own scripts. These tests pin the guarantee
// down from both sides: installed early it defeats the closed boundary,
// installed late it reaches the remote end and changes nothing until the
// next document.


use mock_driver::{MockDriver, MockOptions};
use shadowprobe::shadow::{self, ProbeResult, ShadowMode, page, selected_text};
use shadowprobe::{Endpoint, Error, ScriptInjector, Session, SessionOptions};

fn remote_options(mock: &MockDriver) -> SessionOptions {
    SessionOptions::new(MockDriver::page_url()).endpoint(Endpoint::Remote(mock.url()))
}

#[tokio::test]
async fn late_install_does_not_open_the_current_document() {
    let mock = MockDriver::start().await;
    let mut session = Session::open(remote_options(&mock))
        .await
        .expect("Failed to open session");

    assert_eq!(
        shadow::probe_closed_subtree_via_root(&session)
            .await
            .expect("closed probe failed"),
        ProbeResult::RootUnavailable
    );

    // Misuse scenario: installing after navigation.
    ScriptInjector::install(&mut session)
        .await
        .expect("late install should still reach the remote end");
    assert_eq!(mock.injected_scripts().len(), 1);

    // The already-loaded document keeps its boundary.
    assert_eq!(
        shadow::probe_closed_subtree_via_root(&session)
            .await
            .expect("closed probe failed"),
        ProbeResult::RootUnavailable
    );

    session.close().await.expect("Failed to close session");
    mock.shutdown();
}

#[tokio::test]
async fn late_install_applies_to_the_next_document() {
    let mock = MockDriver::start().await;
    let mut session = Session::open(remote_options(&mock))
        .await
        .expect("Failed to open session");

    ScriptInjector::install(&mut session)
        .await
        .expect("install failed");

    // The override runs on every new document, so re-navigating picks
    // it up.
    session
        .goto(MockDriver::page_url().as_str())
        .await
        .expect("second navigation failed");

    assert_eq!(
        shadow::probe_closed_subtree_via_root(&session)
            .await
            .expect("closed probe failed"),
        ProbeResult::Selected(selected_text(page::CLOSED_BUTTON, ShadowMode::Closed))
    );

    session.close().await.expect("Failed to close session");
    mock.shutdown();
}

#[tokio::test]
async fn second_install_fails_fast() {
    let mock = MockDriver::start().await;
    let mut session = Session::open(remote_options(&mock))
        .await
        .expect("Failed to open session");

    ScriptInjector::install(&mut session)
        .await
        .expect("first install failed");

    let second = ScriptInjector::install(&mut session).await;
    assert!(matches!(second, Err(Error::CommandRedefined { .. })));

    // The failed registration did not sneak a second script in.
    assert_eq!(mock.injected_scripts().len(), 1);

    session.close().await.expect("Failed to close session");
    mock.shutdown();
}

#[tokio::test]
async fn rejected_vendor_command_aborts_before_navigation() {
    let mock = MockDriver::start_with(MockOptions {
        vendor_enabled: false,
        ..MockOptions::default()
    })
    .await;

    let result = Session::open(remote_options(&mock).shadow_override(true)).await;

    match result {
        Err(Error::Protocol(message)) => {
            assert!(message.contains("unknown command"), "got: {message}");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }

    // A session with an unverified override state never navigates, and the
    // failed open still tore its session down.
    assert_eq!(mock.navigations(), 0);
    assert_eq!(mock.live_sessions(), 0);
    assert_eq!(mock.deleted_sessions().len(), 1);
    mock.shutdown();
}

#[tokio::test]
async fn installed_override_is_what_the_page_receives() {
    let mock = MockDriver::start().await;
    let session = Session::open(remote_options(&mock).shadow_override(true))
        .await
        .expect("Failed to open session");

    let scripts = mock.injected_scripts();
    assert_eq!(scripts, vec![shadowprobe::OVERRIDE_SCRIPT.to_string()]);

    session.close().await.expect("Failed to close session");
    mock.shutdown();
}
