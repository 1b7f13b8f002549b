//! Integration tests for emergency sharing.
//!
//! These tests drive `SafepathCore` the way the emergency button does:
//! - Pre-start checks (contacts, location capability)
//! - Geocode, format, and transmit per location update
//! - Share sheet vs clipboard fallback
//! - Stop semantics, including fixes still in flight

mod helpers;

use helpers::{settle, wait_for, Harness, RecordingShareSheet, ScriptedGeocoder};
use safepath_core::location::{ChannelLocationProvider, LocationError, RawPosition};
use safepath_core::sharing::{Notification, SessionState, SharingError};

// ==================== Pre-start checks ====================

#[tokio::test]
async fn start_with_no_contacts_reports_and_stays_inactive() {
    let mut h = Harness::clipboard_only("X St");

    let err = h.core.start_sharing().unwrap_err();

    assert!(matches!(err, SharingError::NoContacts));
    assert!(!h.core.is_sharing());
    assert_eq!(h.core.drain_notifications(), vec![Notification::NoContacts]);
    assert!(!h.location.is_watching());
}

#[tokio::test]
async fn toggle_with_no_contacts_stays_inactive() {
    let mut h = Harness::clipboard_only("X St");

    assert_eq!(h.core.toggle_sharing(), SessionState::Inactive);
    assert_eq!(h.core.drain_notifications(), vec![Notification::NoContacts]);
}

#[tokio::test]
async fn start_without_location_capability_reports_and_stays_inactive() {
    let mut h = Harness::new(
        ChannelLocationProvider::unavailable(),
        ScriptedGeocoder::always("X St"),
        RecordingShareSheet::unavailable(),
    );
    h.core.add_contact("A", "1", None).unwrap();
    let _ = h.core.drain_notifications();

    let err = h.core.start_sharing().unwrap_err();

    assert!(matches!(err, SharingError::LocationUnsupported));
    assert!(!h.core.is_sharing());
    assert_eq!(
        h.core.drain_notifications(),
        vec![Notification::LocationUnsupported]
    );
}

// ==================== End-to-end ====================

#[tokio::test]
async fn one_fix_is_sent_then_stop_confirms() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();
    let _ = h.core.drain_notifications();

    assert_eq!(h.core.toggle_sharing(), SessionState::Active);
    assert!(h.location.push_position(RawPosition::new(1.0, 2.0)));

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| !clipboard.writes().is_empty()).await);
    let message = &h.clipboard.writes()[0];
    assert!(message.contains("X St"));
    assert!(message.contains("https://maps.google.com/?q=1,2"));
    assert_eq!(h.core.drain_notifications(), vec![Notification::LocationCopied]);

    assert_eq!(h.core.toggle_sharing(), SessionState::Inactive);
    assert_eq!(h.core.drain_notifications(), vec![Notification::SharingStopped]);
}

#[tokio::test]
async fn share_sheet_is_preferred_when_available() {
    let mut h = Harness::new(
        ChannelLocationProvider::new(),
        ScriptedGeocoder::always("X St"),
        RecordingShareSheet::available(),
    );
    h.core.add_contact("A", "1", None).unwrap();
    let _ = h.core.drain_notifications();
    h.core.start_sharing().unwrap();

    h.location.push_position(RawPosition::new(-33.9, 18.4));

    let share_sheet = h.share_sheet.clone();
    assert!(wait_for(|| !share_sheet.shared().is_empty()).await);
    let payload = &h.share_sheet.shared()[0];
    assert_eq!(payload.title, "Emergency Location Share");
    assert_eq!(payload.url, "https://maps.google.com/?q=-33.9,18.4");
    assert!(payload.text.contains("My location: X St"));
    assert!(h.clipboard.writes().is_empty());
    assert!(h.core.drain_notifications().is_empty());
}

#[tokio::test]
async fn geocode_failure_falls_back_to_coordinates() {
    let mut h = Harness::new(
        ChannelLocationProvider::new(),
        ScriptedGeocoder::failing(),
        RecordingShareSheet::unavailable(),
    );
    h.core.add_contact("A", "1", None).unwrap();
    h.core.start_sharing().unwrap();

    h.location.push_position(RawPosition::new(12.5, -7.25));

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| !clipboard.writes().is_empty()).await);
    assert!(h.clipboard.writes()[0].contains("My location: 12.5, -7.25"));
    assert!(h.core.is_sharing());
}

#[tokio::test]
async fn every_fix_is_sent_in_arrival_order() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();
    h.core.start_sharing().unwrap();

    for i in 0..5 {
        h.location.push_position(RawPosition::new(f64::from(i), 0.0));
    }

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| clipboard.writes().len() == 5).await);
    let writes = h.clipboard.writes();
    for (i, message) in writes.iter().enumerate() {
        assert!(
            message.contains(&format!("?q={i},0")),
            "message {i} out of order: {message}"
        );
    }
}

#[tokio::test]
async fn share_failure_does_not_end_session() {
    let mut h = Harness::new(
        ChannelLocationProvider::new(),
        ScriptedGeocoder::always("X St"),
        RecordingShareSheet::failing(),
    );
    h.core.add_contact("A", "1", None).unwrap();
    h.core.start_sharing().unwrap();

    h.location.push_position(RawPosition::new(1.0, 2.0));
    h.location.push_position(RawPosition::new(3.0, 4.0));

    let share_sheet = h.share_sheet.clone();
    assert!(wait_for(|| share_sheet.shared().len() == 2).await);
    assert!(h.core.is_sharing());
    assert!(h.location.is_watching());
    // No clipboard fallback after a failed share.
    assert!(h.clipboard.writes().is_empty());
}

#[tokio::test]
async fn location_error_is_reported_and_session_continues() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();
    let _ = h.core.drain_notifications();
    h.core.start_sharing().unwrap();

    h.location.push_error(LocationError::PermissionDenied);
    h.location.push_position(RawPosition::new(1.0, 2.0));

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| !clipboard.writes().is_empty()).await);
    assert_eq!(
        h.core.drain_notifications(),
        vec![
            Notification::LocationError {
                message: "Location permission denied".to_string()
            },
            Notification::LocationCopied,
        ]
    );
    assert!(h.core.is_sharing());
}

#[tokio::test(start_paused = true)]
async fn platform_timeout_reported_once_and_session_continues() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();
    let _ = h.core.drain_notifications();
    h.core.start_sharing().unwrap();

    // A device at rest produces no updates and no toasts.
    tokio::time::sleep(std::time::Duration::from_secs(35)).await;
    assert!(h.core.drain_notifications().is_empty());

    h.location.push_error(LocationError::Timeout);
    h.location.push_error(LocationError::Timeout);
    h.location.push_position(RawPosition::new(1.0, 2.0));

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| !clipboard.writes().is_empty()).await);
    assert_eq!(
        h.core.drain_notifications(),
        vec![
            Notification::LocationError {
                message: "Timed out waiting for a location update".to_string()
            },
            Notification::LocationCopied,
        ]
    );
    assert!(h.core.is_sharing());
}

// ==================== Stop semantics ====================

#[tokio::test]
async fn no_transmission_after_stop() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();
    h.core.start_sharing().unwrap();

    h.core.stop_sharing();
    h.location.push_position(RawPosition::new(1.0, 2.0));
    settle().await;

    assert!(h.clipboard.writes().is_empty());
    assert_eq!(h.geocoder.calls(), 0);
    let location = h.location.clone();
    assert!(wait_for(|| !location.is_watching()).await);
}

#[tokio::test]
async fn fix_in_flight_at_stop_is_dropped() {
    let (geocoder, gate) = ScriptedGeocoder::gated("X St");
    let mut h = Harness::new(
        ChannelLocationProvider::new(),
        geocoder,
        RecordingShareSheet::unavailable(),
    );
    h.core.add_contact("A", "1", None).unwrap();
    h.core.start_sharing().unwrap();

    h.location.push_position(RawPosition::new(1.0, 2.0));
    let geocoder = h.geocoder.clone();
    assert!(wait_for(|| geocoder.calls() == 1).await);

    h.core.stop_sharing();
    gate.add_permits(1);
    settle().await;

    assert!(h.clipboard.writes().is_empty());
    assert_eq!(h.core.drain_notifications().last(), Some(&Notification::SharingStopped));
}

#[tokio::test]
async fn restarted_session_sends_again() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();

    h.core.start_sharing().unwrap();
    h.core.stop_sharing();
    h.core.start_sharing().unwrap();
    h.location.push_position(RawPosition::new(5.0, 6.0));

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| clipboard.writes().len() == 1).await);
    settle().await;
    assert_eq!(h.clipboard.writes().len(), 1);
}

#[tokio::test]
async fn removing_all_contacts_keeps_active_session() {
    let mut h = Harness::clipboard_only("X St");
    h.core.add_contact("A", "1", None).unwrap();
    h.core.start_sharing().unwrap();

    h.core.remove_contact(0).unwrap();
    h.location.push_position(RawPosition::new(1.0, 2.0));

    let clipboard = h.clipboard.clone();
    assert!(wait_for(|| !clipboard.writes().is_empty()).await);
    assert!(h.core.is_sharing());
}
