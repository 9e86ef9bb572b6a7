//! Persistence and facility lookup seams, with in-memory implementations.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use notifier_core::{
    DeliveryStatus, EmergencyKind, EmergencyNotification, Facility, FacilityKind, NewNotification,
    Notification, NotificationId, NotifierError, PatientId, RiskAssessment, RiskLevel,
};
use serde::{Deserialize, Serialize};

pub type AssessmentId = u64;

/// Create/update operations the escalation flow depends on.
pub trait RecordStore {
    fn save_assessment(&mut self, assessment: RiskAssessment)
        -> Result<AssessmentId, NotifierError>;

    fn create_notification(
        &mut self,
        notification: NewNotification,
    ) -> Result<Notification, NotifierError>;

    /// Persists a new record and returns it with its assigned id.
    fn create_emergency(
        &mut self,
        record: EmergencyNotification,
    ) -> Result<EmergencyNotification, NotifierError>;

    fn update_emergency(&mut self, record: &EmergencyNotification) -> Result<(), NotifierError>;

    fn emergency(&self, id: NotificationId) -> Result<EmergencyNotification, NotifierError>;
}

/// Facility search; no match is `Ok(None)`, not an error.
pub trait FacilityDirectory {
    fn find_facility(
        &self,
        kind: FacilityKind,
        requires_phone: bool,
    ) -> Result<Option<Facility>, NotifierError>;
}

/// Assessment together with the id it was stored under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAssessment {
    pub id: AssessmentId,
    #[serde(flatten)]
    pub assessment: RiskAssessment,
}

/// Aggregate counts over emergency records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EmergencyStats {
    pub status_counts: HashMap<DeliveryStatus, usize>,
    pub risk_level_counts: HashMap<RiskLevel, usize>,
    pub type_counts: HashMap<EmergencyKind, usize>,
    pub recent_notifications_24h: usize,
    pub total_notifications: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    assessments: Vec<StoredAssessment>,
    notifications: Vec<Notification>,
    emergencies: Vec<EmergencyNotification>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn latest_assessment(&self, patient_id: PatientId) -> Option<&StoredAssessment> {
        self.assessments
            .iter()
            .filter(|stored| stored.assessment.patient_id == patient_id)
            .max_by_key(|stored| (stored.assessment.assessed_at, stored.id))
    }

    /// Newest first.
    pub fn assessment_history(&self, patient_id: PatientId) -> Vec<&StoredAssessment> {
        let mut history: Vec<_> = self
            .assessments
            .iter()
            .filter(|stored| stored.assessment.patient_id == patient_id)
            .collect();
        history.sort_by(|a, b| {
            (b.assessment.assessed_at, b.id).cmp(&(a.assessment.assessed_at, a.id))
        });
        history
    }

    /// Newest first.
    pub fn notifications_for(&self, patient_id: PatientId) -> Vec<&Notification> {
        let mut found: Vec<_> = self
            .notifications
            .iter()
            .filter(|n| n.patient_id == patient_id)
            .collect();
        found.sort_by(|a, b| (b.sent_at, b.id).cmp(&(a.sent_at, a.id)));
        found
    }

    pub fn unread_count(&self, patient_id: PatientId) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.patient_id == patient_id && !n.read_status)
            .count()
    }

    pub fn mark_read(&mut self, id: NotificationId) -> Result<&Notification, NotifierError> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(NotifierError::NotFound {
                kind: "notification",
                id,
            })?;
        notification.mark_as_read();
        Ok(notification)
    }

    /// Returns how many notifications changed state.
    pub fn mark_all_read(&mut self, patient_id: PatientId) -> usize {
        let mut changed = 0;
        for notification in self
            .notifications
            .iter_mut()
            .filter(|n| n.patient_id == patient_id && !n.read_status)
        {
            notification.mark_as_read();
            changed += 1;
        }
        changed
    }

    /// Filtered by patient and/or status, newest first.
    pub fn emergency_notifications(
        &self,
        patient_id: Option<PatientId>,
        status: Option<DeliveryStatus>,
    ) -> Vec<&EmergencyNotification> {
        let mut found: Vec<_> = self
            .emergencies
            .iter()
            .filter(|e| patient_id.map_or(true, |id| e.patient_id == id))
            .filter(|e| status.map_or(true, |s| e.status == s))
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        found
    }

    /// Pending records, most urgent first, then oldest first.
    pub fn pending_emergencies(&self) -> Vec<&EmergencyNotification> {
        let mut pending: Vec<_> = self
            .emergencies
            .iter()
            .filter(|e| e.status == DeliveryStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then((a.created_at, a.id).cmp(&(b.created_at, b.id)))
        });
        pending
    }

    pub fn emergency_stats(&self, now: DateTime<Utc>) -> EmergencyStats {
        let cutoff = now - Duration::hours(24);
        let mut stats = EmergencyStats {
            total_notifications: self.emergencies.len(),
            ..EmergencyStats::default()
        };
        for record in &self.emergencies {
            *stats.status_counts.entry(record.status).or_default() += 1;
            *stats.risk_level_counts.entry(record.risk_level).or_default() += 1;
            *stats.type_counts.entry(record.notification_type).or_default() += 1;
            if record.created_at >= cutoff {
                stats.recent_notifications_24h += 1;
            }
        }
        stats
    }
}

impl RecordStore for InMemoryStore {
    fn save_assessment(
        &mut self,
        assessment: RiskAssessment,
    ) -> Result<AssessmentId, NotifierError> {
        let id = self.allocate_id();
        self.assessments.push(StoredAssessment { id, assessment });
        Ok(id)
    }

    fn create_notification(
        &mut self,
        notification: NewNotification,
    ) -> Result<Notification, NotifierError> {
        let record = Notification {
            id: self.allocate_id(),
            patient_id: notification.patient_id,
            message: notification.message,
            risk_level: notification.risk_level,
            notification_type: notification.notification_type,
            sent_at: Utc::now(),
            read_status: false,
            read_at: None,
        };
        self.notifications.push(record.clone());
        Ok(record)
    }

    fn create_emergency(
        &mut self,
        mut record: EmergencyNotification,
    ) -> Result<EmergencyNotification, NotifierError> {
        record.id = self.allocate_id();
        self.emergencies.push(record.clone());
        Ok(record)
    }

    fn update_emergency(&mut self, record: &EmergencyNotification) -> Result<(), NotifierError> {
        let slot = self
            .emergencies
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(NotifierError::NotFound {
                kind: "emergency notification",
                id: record.id,
            })?;
        *slot = record.clone();
        Ok(())
    }

    fn emergency(&self, id: NotificationId) -> Result<EmergencyNotification, NotifierError> {
        self.emergencies
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(NotifierError::NotFound {
                kind: "emergency notification",
                id,
            })
    }
}

/// Facility list searched in order; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    facilities: Vec<Facility>,
}

impl InMemoryDirectory {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }
}

impl FacilityDirectory for InMemoryDirectory {
    fn find_facility(
        &self,
        kind: FacilityKind,
        requires_phone: bool,
    ) -> Result<Option<Facility>, NotifierError> {
        Ok(self
            .facilities
            .iter()
            .find(|facility| facility.is_kind(kind) && (!requires_phone || facility.has_phone()))
            .cloned())
    }
}
