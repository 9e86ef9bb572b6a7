use chrono::{Duration, Utc};
use notifier_core::{
    DeliveryStatus, EmergencyKind, EmergencyNotification, Facility, FacilityKind,
    NewNotification, Notification, NotificationId, NotificationKind, NotifierError, Patient,
    Priority, RiskAssessment, RiskLevel, ScoringConfig, WeatherSnapshot,
};
use notifier_engine::message::fallback_message;
use notifier_engine::{
    AssessmentId, EscalationOutcome, Escalator, FacilityDirectory, FallbackReason, FixedWeather,
    InMemoryDirectory, InMemoryStore, MessageComposer, MessageGenerator, NoGenerator,
    RecordStore, RiskEngine,
};
use serde_json::json;

struct CannedGenerator(&'static str);

impl MessageGenerator for CannedGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, NotifierError> {
        Ok(self.0.to_string())
    }
}

struct BrokenDirectory;

impl FacilityDirectory for BrokenDirectory {
    fn find_facility(
        &self,
        _kind: FacilityKind,
        _requires_phone: bool,
    ) -> Result<Option<Facility>, NotifierError> {
        Err(NotifierError::FacilityLookup("connection refused".to_string()))
    }
}

/// In-memory store that can be told to fail writes.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    fail_creates: bool,
    fail_updates: bool,
}

impl RecordStore for FlakyStore {
    fn save_assessment(
        &mut self,
        assessment: RiskAssessment,
    ) -> Result<AssessmentId, NotifierError> {
        self.inner.save_assessment(assessment)
    }

    fn create_notification(
        &mut self,
        notification: NewNotification,
    ) -> Result<Notification, NotifierError> {
        if self.fail_creates {
            return Err(NotifierError::Storage("disk full".to_string()));
        }
        self.inner.create_notification(notification)
    }

    fn create_emergency(
        &mut self,
        record: EmergencyNotification,
    ) -> Result<EmergencyNotification, NotifierError> {
        if self.fail_creates {
            return Err(NotifierError::Storage("disk full".to_string()));
        }
        self.inner.create_emergency(record)
    }

    fn update_emergency(&mut self, record: &EmergencyNotification) -> Result<(), NotifierError> {
        if self.fail_updates {
            return Err(NotifierError::Storage("read-only replica".to_string()));
        }
        self.inner.update_emergency(record)
    }

    fn emergency(&self, id: NotificationId) -> Result<EmergencyNotification, NotifierError> {
        self.inner.emergency(id)
    }
}

fn weather(temperature: f64, is_heat_wave: bool) -> FixedWeather {
    FixedWeather(WeatherSnapshot {
        temperature,
        feels_like: temperature,
        humidity: 35.0,
        pressure: 1009.0,
        description: "clear sky".to_string(),
        is_heat_wave,
        heat_index: temperature,
    })
}

/// Scores 8: young, third trimester, pre-eclampsia, heat wave.
fn high_risk_patient() -> Patient {
    Patient {
        id: 101,
        name: "Дарья Кузнецова".to_string(),
        age: 19,
        weeks_pregnant: Some(30),
        pregnancy_icd10: Some("O14".to_string()),
        pregnancy_description: Some("Pre-eclampsia".to_string()),
        between_17_35: Some(true),
        zip_code: "85001".to_string(),
        ..Patient::default()
    }
}

/// Scores 5 on a 31°C day.
fn medium_risk_patient() -> Patient {
    Patient {
        id: 202,
        name: "Ольга Соколова".to_string(),
        age: 25,
        weeks_pregnant: Some(10),
        between_17_35: Some(false),
        zip_code: "85001".to_string(),
        ..Patient::default()
    }
}

/// Scores 0 on a mild day.
fn low_risk_patient() -> Patient {
    Patient {
        id: 303,
        name: "Ирина Волкова".to_string(),
        age: 40,
        weeks_pregnant: Some(20),
        zip_code: "85001".to_string(),
        ..Patient::default()
    }
}

fn facility(id: u64, code: &str, phone: Option<&str>) -> Facility {
    Facility {
        id,
        facility_id: format!("F-{id}"),
        facility_name: format!("Facility {id}"),
        short_description: Some(code.to_string()),
        facility_address_1: Some(format!("{id} Main St")),
        facility_city: Some("Phoenix".to_string()),
        facility_state: Some("AZ".to_string()),
        facility_phone_number: phone.map(str::to_string),
        ..Facility::default()
    }
}

fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new(vec![
        facility(1, "HOSP", None),
        facility(2, "HOSP", Some("+1-602-555-0100")),
        facility(3, "DTC", Some("+1-602-555-0199")),
    ])
}

fn escalator<S: RecordStore, F: FacilityDirectory>(
    weather: FixedWeather,
    store: S,
    facilities: F,
) -> Escalator<FixedWeather, CannedGenerator, S, F> {
    Escalator::new(
        RiskEngine::new(weather, ScoringConfig::default()),
        MessageComposer::new(CannedGenerator("Берегите себя")),
        store,
        facilities,
    )
}

#[test]
fn high_risk_calls_a_hospital_with_a_phone() {
    let mut escalator = escalator(weather(37.0, true), InMemoryStore::new(), directory());
    let patient = high_risk_patient();

    let result = escalator.escalate(&patient);
    assert!(result.success);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.risk_score, 8);
    assert_eq!(result.action_taken(), "doctor_called");
    assert_eq!(result.message(), "Берегите себя");

    let EscalationOutcome::DoctorCalled {
        hospital,
        emergency_notification_id,
        emergency_status,
        notification_id,
        ..
    } = result.outcome
    else {
        panic!("expected a doctor call");
    };
    assert_eq!(hospital.id, 2);
    assert_eq!(emergency_status, DeliveryStatus::Sent);

    let store = escalator.store();
    let record = store
        .emergency(emergency_notification_id)
        .expect("emergency record stored");
    assert_eq!(record.status, DeliveryStatus::Sent);
    assert!(record.sent_at.is_some());
    assert_eq!(record.priority, Priority::Critical);
    assert_eq!(record.notification_type, EmergencyKind::DoctorCall);
    assert_eq!(record.health_facility_id, 2);
    assert!(record.message.contains("ЭКСТРЕННОЕ УВЕДОМЛЕНИЕ"));
    assert!(record.message.contains("Дарья Кузнецова"));
    assert!(record.message.contains("O14 - Pre-eclampsia"));
    assert!(record.message.contains("Телефон: не указано"));

    let notifications = store.notifications_for(patient.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].id, notification_id);
    assert_eq!(notifications[0].risk_level, RiskLevel::High);
    assert_eq!(
        notifications[0].notification_type,
        NotificationKind::HeatWarning
    );
}

#[test]
fn high_risk_without_hospital_falls_back() {
    let directory = InMemoryDirectory::new(vec![
        facility(1, "HOSP", None),
        facility(3, "DTC", Some("+1-602-555-0199")),
    ]);
    let mut escalator = escalator(weather(37.0, true), InMemoryStore::new(), directory);
    let patient = high_risk_patient();

    let result = escalator.escalate(&patient);
    assert!(result.success);
    assert!(result.is_fallback());
    assert_eq!(result.action_taken(), "fallback_notification");
    assert_eq!(result.message(), fallback_message(&patient, RiskLevel::High));
    assert!(matches!(
        result.outcome,
        EscalationOutcome::FallbackNotification {
            reason: FallbackReason::NoHospitalAvailable,
            ..
        }
    ));
    assert!(escalator
        .store()
        .emergency_notifications(None, None)
        .is_empty());
}

#[test]
fn facility_lookup_error_falls_back() {
    let mut escalator = escalator(weather(37.0, true), InMemoryStore::new(), BrokenDirectory);

    let result = escalator.escalate(&high_risk_patient());
    assert!(result.success);
    match result.outcome {
        EscalationOutcome::FallbackNotification {
            reason: FallbackReason::FacilityLookupFailed { detail },
            ..
        } => assert!(detail.contains("connection refused")),
        other => panic!("expected lookup fallback, got {other:?}"),
    }
}

#[test]
fn storage_failure_falls_back() {
    let store = FlakyStore {
        fail_creates: true,
        ..FlakyStore::default()
    };
    let mut escalator = escalator(weather(37.0, true), store, directory());

    let result = escalator.escalate(&high_risk_patient());
    assert!(result.success);
    assert!(matches!(
        result.outcome,
        EscalationOutcome::FallbackNotification {
            reason: FallbackReason::StorageFailed { .. },
            ..
        }
    ));

    let mut low = escalator_with_store(FlakyStore {
        fail_creates: true,
        ..FlakyStore::default()
    });
    assert!(low.escalate(&low_risk_patient()).is_fallback());
}

fn escalator_with_store(
    store: FlakyStore,
) -> Escalator<FixedWeather, CannedGenerator, FlakyStore, InMemoryDirectory> {
    escalator(weather(22.0, false), store, directory())
}

#[test]
fn failed_dispatch_still_reports_the_doctor_call() {
    let store = FlakyStore {
        fail_updates: true,
        ..FlakyStore::default()
    };
    let mut escalator = escalator(weather(37.0, true), store, directory());

    let result = escalator.escalate(&high_risk_patient());
    match result.outcome {
        EscalationOutcome::DoctorCalled {
            emergency_status, ..
        } => assert_eq!(emergency_status, DeliveryStatus::Failed),
        other => panic!("expected a doctor call, got {other:?}"),
    }
}

#[test]
fn medium_risk_refers_to_a_clinic() {
    let mut escalator = escalator(weather(31.0, false), InMemoryStore::new(), directory());
    let patient = medium_risk_patient();

    let result = escalator.escalate(&patient);
    assert_eq!(result.risk_level, RiskLevel::Medium);
    assert_eq!(result.risk_score, 5);
    assert_eq!(result.action_taken(), "enhanced_notification_sent");
    match &result.outcome {
        EscalationOutcome::EnhancedNotificationSent { clinic, .. } => {
            assert_eq!(clinic.as_ref().map(|c| c.id), Some(3));
        }
        other => panic!("expected enhanced notification, got {other:?}"),
    }

    let notifications = escalator.store().notifications_for(patient.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].notification_type,
        NotificationKind::GeneralHealth
    );
}

#[test]
fn medium_risk_tolerates_clinic_lookup_failure() {
    let mut escalator = escalator(weather(31.0, false), InMemoryStore::new(), BrokenDirectory);

    let result = escalator.escalate(&medium_risk_patient());
    match result.outcome {
        EscalationOutcome::EnhancedNotificationSent { clinic, .. } => assert!(clinic.is_none()),
        other => panic!("expected enhanced notification, got {other:?}"),
    }
}

#[test]
fn low_risk_uses_template_without_generator() {
    let mut escalator = Escalator::new(
        RiskEngine::new(weather(22.0, false), ScoringConfig::default()),
        MessageComposer::new(NoGenerator),
        InMemoryStore::new(),
        directory(),
    );
    let patient = low_risk_patient();

    let result = escalator.escalate(&patient);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.action_taken(), "standard_notification_sent");
    assert!(result.message().starts_with("Уважаемая Ирина,"));
    assert!(result.message().ends_with("Все идет хорошо!"));
    assert_eq!(escalator.store().unread_count(patient.id), 1);
}

#[test]
fn respond_attaches_text_then_delivery_closes_the_record() {
    let mut escalator = escalator(weather(37.0, true), InMemoryStore::new(), directory());
    let result = escalator.escalate(&high_risk_patient());
    let EscalationOutcome::DoctorCalled {
        emergency_notification_id: id,
        ..
    } = result.outcome
    else {
        panic!("expected a doctor call");
    };

    let answered = escalator
        .respond(id, Some("Бригада выехала"))
        .expect("response on sent record");
    assert_eq!(answered.status, DeliveryStatus::Sent);
    assert!(answered.response_received);

    let delivered = escalator.respond(id, None).expect("sent -> delivered");
    assert_eq!(delivered.status, DeliveryStatus::Delivered);
    assert_eq!(
        delivered.response_message.as_deref(),
        Some("Бригада выехала")
    );

    let err = escalator.respond(id, Some("late")).unwrap_err();
    assert!(matches!(
        err,
        NotifierError::ResponseRejected(DeliveryStatus::Delivered)
    ));
    assert!(matches!(
        escalator.respond(9999, None),
        Err(NotifierError::NotFound { .. })
    ));
}

#[test]
fn record_assessment_stores_assessment_and_notification() {
    let mut escalator = escalator(weather(22.0, false), InMemoryStore::new(), directory());
    let patient = low_risk_patient();

    let first = escalator
        .record_assessment(&patient)
        .expect("first assessment");
    let second = escalator
        .record_assessment(&patient)
        .expect("second assessment");
    assert_eq!(first.message, "Берегите себя");
    assert_ne!(first.assessment_id, second.assessment_id);

    let store = escalator.store_mut();
    let latest = store
        .latest_assessment(patient.id)
        .expect("latest assessment");
    assert_eq!(latest.id, second.assessment_id);
    assert_eq!(store.assessment_history(patient.id).len(), 2);
    assert!(store.latest_assessment(999).is_none());

    assert_eq!(store.unread_count(patient.id), 2);
    store
        .mark_read(first.notification_id)
        .expect("mark one read");
    assert_eq!(store.unread_count(patient.id), 1);
    assert_eq!(store.mark_all_read(patient.id), 1);
    assert_eq!(store.unread_count(patient.id), 0);
    assert_eq!(store.mark_all_read(patient.id), 0);
}

#[test]
fn pending_queue_orders_by_priority_then_age() {
    let mut store = InMemoryStore::new();
    let now = Utc::now();

    let mut older_high = EmergencyNotification::pending(
        1,
        2,
        RiskLevel::Medium,
        EmergencyKind::PatientNotification,
        Priority::High,
        "older".to_string(),
    );
    older_high.created_at = now - Duration::hours(30);
    let newer_high = EmergencyNotification {
        created_at: now - Duration::hours(1),
        message: "newer".to_string(),
        ..older_high.clone()
    };
    let critical = EmergencyNotification::pending(
        3,
        2,
        RiskLevel::High,
        EmergencyKind::DoctorCall,
        Priority::Critical,
        "critical".to_string(),
    );

    let newer_high = store.create_emergency(newer_high).expect("create");
    let older_high = store.create_emergency(older_high).expect("create");
    let mut critical = store.create_emergency(critical).expect("create");

    let order: Vec<_> = store.pending_emergencies().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![critical.id, older_high.id, newer_high.id]);

    critical.mark_as_sent().expect("pending -> sent");
    store.update_emergency(&critical).expect("update");
    assert_eq!(store.pending_emergencies().len(), 2);

    let sent = store.emergency_notifications(None, Some(DeliveryStatus::Sent));
    assert_eq!(sent.len(), 1);
    assert_eq!(store.emergency_notifications(Some(1), None).len(), 2);

    let stats = store.emergency_stats(now);
    assert_eq!(stats.total_notifications, 3);
    assert_eq!(stats.recent_notifications_24h, 2);
    assert_eq!(stats.status_counts.get(&DeliveryStatus::Pending), Some(&2));
    assert_eq!(stats.status_counts.get(&DeliveryStatus::Sent), Some(&1));
    assert_eq!(stats.risk_level_counts.get(&RiskLevel::Medium), Some(&2));
    assert_eq!(stats.type_counts.get(&EmergencyKind::DoctorCall), Some(&1));
}

#[test]
fn fallback_result_serializes_with_action_tag() {
    let mut escalator = escalator(
        weather(37.0, true),
        InMemoryStore::new(),
        InMemoryDirectory::default(),
    );

    let result = escalator.escalate(&high_risk_patient());
    let value = serde_json::to_value(&result).expect("serialize result");
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["risk_level"], json!("high"));
    assert_eq!(value["action_taken"], json!("fallback_notification"));
    assert_eq!(value["reason"], json!({ "kind": "no_hospital_available" }));
    assert!(value["message"]
        .as_str()
        .is_some_and(|text| text.contains("HIGH")));
}
