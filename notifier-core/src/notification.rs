use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::RiskLevel;
use crate::error::NotifierError;
use crate::facility::FacilityId;
use crate::patient::PatientId;

pub type NotificationId = u64;

/// Topic of a patient-facing notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    HeatWarning,
    #[default]
    GeneralHealth,
    AppointmentReminder,
}

/// Patient-facing message with read tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub patient_id: PatientId,
    pub message: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub notification_type: NotificationKind,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read_status: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn mark_as_read(&mut self) {
        if !self.read_status {
            self.read_status = true;
            self.read_at = Some(Utc::now());
        }
    }
}

/// Fields required to create a [`Notification`]; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub patient_id: PatientId,
    pub message: String,
    pub risk_level: RiskLevel,
    pub notification_type: NotificationKind,
}

/// Kind of escalation an emergency record represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyKind {
    PatientNotification,
    DoctorCall,
    EmergencyAlert,
}

/// Ordering follows urgency, so `Critical` sorts last.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Delivery state of an emergency record.
///
/// `Pending -> Sent -> Delivered`, or `Pending | Sent -> Failed`.
/// `Delivered` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }

    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Sent)
                | (Self::Sent, Self::Delivered)
                | (Self::Pending, Self::Failed)
                | (Self::Sent, Self::Failed)
        )
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation record addressed to a health facility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyNotification {
    pub id: NotificationId,
    pub patient_id: PatientId,
    pub health_facility_id: FacilityId,
    pub risk_level: RiskLevel,
    pub notification_type: EmergencyKind,
    pub message: String,
    pub status: DeliveryStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub response_received: bool,
    pub response_message: Option<String>,
    pub response_received_at: Option<DateTime<Utc>>,
}

impl EmergencyNotification {
    /// Builds a pending record; the id is assigned by the store.
    pub fn pending(
        patient_id: PatientId,
        health_facility_id: FacilityId,
        risk_level: RiskLevel,
        notification_type: EmergencyKind,
        priority: Priority,
        message: String,
    ) -> Self {
        Self {
            id: 0,
            patient_id,
            health_facility_id,
            risk_level,
            notification_type,
            message,
            status: DeliveryStatus::Pending,
            priority,
            created_at: Utc::now(),
            sent_at: None,
            delivered_at: None,
            failed_at: None,
            response_received: false,
            response_message: None,
            response_received_at: None,
        }
    }

    pub fn mark_as_sent(&mut self) -> Result<(), NotifierError> {
        self.transition(DeliveryStatus::Sent)?;
        self.sent_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_as_delivered(&mut self) -> Result<(), NotifierError> {
        self.transition(DeliveryStatus::Delivered)?;
        self.delivered_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_as_failed(&mut self) -> Result<(), NotifierError> {
        self.transition(DeliveryStatus::Failed)?;
        self.failed_at = Some(Utc::now());
        Ok(())
    }

    /// Attaches a facility response without changing the status.
    pub fn add_response(&mut self, response: impl Into<String>) -> Result<(), NotifierError> {
        if self.status.is_terminal() {
            return Err(NotifierError::ResponseRejected(self.status));
        }
        self.response_received = true;
        self.response_message = Some(response.into());
        self.response_received_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, next: DeliveryStatus) -> Result<(), NotifierError> {
        if !self.status.can_transition_to(next) {
            return Err(NotifierError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
