use notifier_core::{
    DeliveryStatus, EmergencyKind, EmergencyNotification, NotifierError, Priority, RiskLevel,
};

fn doctor_call() -> EmergencyNotification {
    EmergencyNotification::pending(
        7,
        3,
        RiskLevel::High,
        EmergencyKind::DoctorCall,
        Priority::Critical,
        "call".to_string(),
    )
}

#[test]
fn pending_record_starts_without_timestamps() {
    let record = doctor_call();
    assert_eq!(record.status, DeliveryStatus::Pending);
    assert!(record.sent_at.is_none());
    assert!(record.delivered_at.is_none());
    assert!(record.failed_at.is_none());
    assert!(!record.response_received);
}

#[test]
fn sent_then_delivered_stamps_each_step() {
    let mut record = doctor_call();
    record.mark_as_sent().expect("pending -> sent");
    assert_eq!(record.status, DeliveryStatus::Sent);
    assert!(record.sent_at.is_some());

    record.mark_as_delivered().expect("sent -> delivered");
    assert_eq!(record.status, DeliveryStatus::Delivered);
    assert!(record.delivered_at.is_some());
}

#[test]
fn delivered_requires_sent_first() {
    let mut record = doctor_call();
    let err = record.mark_as_delivered().unwrap_err();
    assert!(matches!(
        err,
        NotifierError::InvalidTransition {
            from: DeliveryStatus::Pending,
            to: DeliveryStatus::Delivered,
        }
    ));
    assert_eq!(record.status, DeliveryStatus::Pending);
    assert!(record.delivered_at.is_none());
}

#[test]
fn failure_is_allowed_from_pending_and_sent_only() {
    let mut pending = doctor_call();
    pending.mark_as_failed().expect("pending -> failed");
    assert_eq!(pending.status, DeliveryStatus::Failed);
    assert!(pending.failed_at.is_some());

    let mut sent = doctor_call();
    sent.mark_as_sent().expect("pending -> sent");
    sent.mark_as_failed().expect("sent -> failed");

    let mut delivered = doctor_call();
    delivered.mark_as_sent().expect("pending -> sent");
    delivered.mark_as_delivered().expect("sent -> delivered");
    assert!(delivered.mark_as_failed().is_err());
    assert_eq!(delivered.status, DeliveryStatus::Delivered);
}

#[test]
fn terminal_states_reject_every_transition() {
    for terminal in [DeliveryStatus::Delivered, DeliveryStatus::Failed] {
        assert!(terminal.is_terminal());
        for next in [
            DeliveryStatus::Pending,
            DeliveryStatus::Sent,
            DeliveryStatus::Delivered,
            DeliveryStatus::Failed,
        ] {
            assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
        }
    }
}

#[test]
fn response_keeps_status_and_is_rejected_once_terminal() {
    let mut record = doctor_call();
    record.mark_as_sent().expect("pending -> sent");
    record
        .add_response("Doctor on the way")
        .expect("response on sent record");
    assert_eq!(record.status, DeliveryStatus::Sent);
    assert!(record.response_received);
    assert_eq!(record.response_message.as_deref(), Some("Doctor on the way"));
    assert!(record.response_received_at.is_some());

    record.mark_as_failed().expect("sent -> failed");
    let err = record.add_response("too late").unwrap_err();
    assert!(matches!(
        err,
        NotifierError::ResponseRejected(DeliveryStatus::Failed)
    ));
    assert_eq!(record.response_message.as_deref(), Some("Doctor on the way"));
}

#[test]
fn priority_orders_by_urgency() {
    assert!(Priority::Critical > Priority::High);
    assert!(Priority::High > Priority::Medium);
    assert!(Priority::Medium > Priority::Low);
    assert_eq!(Priority::default(), Priority::Medium);
}

#[test]
fn status_serializes_as_snake_case() {
    let json = serde_json::to_string(&DeliveryStatus::Delivered).expect("serialize status");
    assert_eq!(json, "\"delivered\"");
    let kind = serde_json::to_string(&EmergencyKind::DoctorCall).expect("serialize kind");
    assert_eq!(kind, "\"doctor_call\"");
}
