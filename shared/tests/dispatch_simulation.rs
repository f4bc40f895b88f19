mod common;

use assert_matches::assert_matches;
use common::VirtualShell;
use shared::dispatch::{ServiceCategory, ServiceStatus};
use shared::event::{ActivationSource, DispatchVisitId};
use shared::navigation::ViewId;
use shared::timers::TimerPurpose;
use shared::view_model::Screen;
use shared::Event;

/// Signs in, activates and waits for the countdown to land on the dispatch
/// screen. No responder has connected yet on return.
fn on_dispatch_screen() -> VirtualShell {
    let mut shell = VirtualShell::signed_in("plain@x.com");
    shell.send(Event::EmergencyActivated {
        source: ActivationSource::Form,
    });
    shell.advance(5000 + 200);
    assert_eq!(shell.model.navigation.current_view, ViewId::EmergencyDispatch);
    assert!(shell.model.dispatch.connected.is_empty());
    shell
}

fn connected_ids(shell: &VirtualShell) -> Vec<u32> {
    shell.model.dispatch.connected.iter().map(|s| s.id).collect()
}

#[test]
fn responders_connect_in_stages() {
    let mut shell = on_dispatch_screen();

    shell.advance(499);
    assert!(connected_ids(&shell).is_empty());
    shell.advance(1);
    assert_eq!(connected_ids(&shell), vec![1]);

    shell.advance(299);
    assert_eq!(connected_ids(&shell), vec![1]);
    shell.advance(1);
    assert_eq!(connected_ids(&shell), vec![1, 2]);

    shell.advance(200);
    assert_eq!(connected_ids(&shell), vec![1, 2, 3]);
    assert_eq!(shell.model.timers.count_where(TimerPurpose::is_dispatch), 0);

    let connected = &shell.model.dispatch.connected;
    assert_eq!(connected[0].category, ServiceCategory::Medical);
    assert_eq!(connected[1].name, "Ambulance Unit");
    assert_eq!(connected[2].status, ServiceStatus::Notified);
}

#[test]
fn view_reports_progress() {
    let mut shell = on_dispatch_screen();
    shell.advance(800);
    assert_matches!(
        shell.view().screen,
        Screen::EmergencyDispatch { ref services, expected_services: 3, .. } if services.len() == 2
    );
}

#[test]
fn re_entry_starts_a_fresh_visit() {
    let mut shell = on_dispatch_screen();
    shell.advance(1000);
    assert_eq!(connected_ids(&shell).len(), 3);

    shell.navigate(ViewId::Contacts);
    assert!(shell.model.dispatch.connected.is_empty());
    assert_eq!(shell.model.dispatch.visit, None);

    shell.send(Event::NavigateRequested {
        target: ViewId::EmergencyDispatch,
    });
    shell.advance(200);
    assert_eq!(shell.model.dispatch.visit, Some(DispatchVisitId(2)));
    assert!(shell.model.dispatch.connected.is_empty());

    shell.advance(5000);
    assert_eq!(connected_ids(&shell), vec![1, 2, 3]);
}

#[test]
fn leaving_mid_visit_cancels_remaining_connections() {
    let mut shell = on_dispatch_screen();
    shell.advance(600);
    assert_eq!(connected_ids(&shell), vec![1]);

    shell.navigate(ViewId::History);
    assert!(shell.model.dispatch.connected.is_empty());
    assert_eq!(shell.model.timers.count_where(TimerPurpose::is_dispatch), 0);

    shell.advance(5000);
    assert!(shell.model.dispatch.connected.is_empty());
    assert_eq!(shell.pending_timers(), 0);
}

#[test]
fn entering_without_an_emergency_schedules_nothing() {
    let mut shell = VirtualShell::signed_in("plain@x.com");
    shell.navigate(ViewId::EmergencyDispatch);
    assert_eq!(shell.model.navigation.current_view, ViewId::EmergencyDispatch);
    assert_eq!(shell.model.dispatch.visit, None);
    assert_eq!(shell.pending_timers(), 0);

    shell.advance(2000);
    assert!(shell.model.dispatch.connected.is_empty());
}

#[test]
fn resolving_mid_visit_leaves_no_stale_connections() {
    let mut shell = on_dispatch_screen();
    shell.advance(600);
    shell.send(Event::EmergencyResolved);
    assert!(shell.model.dispatch.connected.is_empty());

    shell.advance(2000);
    assert_eq!(shell.model.navigation.current_view, ViewId::Dashboard);
    assert!(shell.model.dispatch.connected.is_empty());
    assert_eq!(shell.pending_timers(), 0);
}

#[test]
fn logout_mid_visit_cancels_everything() {
    let mut shell = on_dispatch_screen();
    shell.advance(100);
    shell.send(Event::LogoutRequested);
    shell.advance(500 + 500);
    assert_eq!(shell.model.navigation.current_view, ViewId::Login);
    assert!(shell.model.dispatch.connected.is_empty());
    assert_eq!(shell.pending_timers(), 0);
}
