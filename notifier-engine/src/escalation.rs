//! Maps a computed risk level to a notification action.
//!
//! `escalate` always yields a result. Each failure point maps to a
//! [`FallbackReason`] and the fallback notification replaces the normal action.

use chrono::Utc;
use notifier_core::{
    DeliveryStatus, EmergencyKind, EmergencyNotification, Facility, FacilityKind,
    NewNotification, NotificationId, NotificationKind, NotifierError, Patient, Priority,
    RiskAssessment, RiskLevel,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::message::{
    doctor_call_message, fallback_message, MessageComposer, MessageGenerator, RiskContext,
};
use crate::risk::RiskEngine;
use crate::store::{AssessmentId, FacilityDirectory, RecordStore};
use crate::weather::WeatherLookup;

/// Outcome of one escalation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationResult {
    pub success: bool,
    pub risk_level: RiskLevel,
    pub risk_score: i32,
    #[serde(flatten)]
    pub outcome: EscalationOutcome,
}

impl EscalationResult {
    pub fn action_taken(&self) -> &'static str {
        self.outcome.action_taken()
    }

    pub fn message(&self) -> &str {
        self.outcome.message()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, EscalationOutcome::FallbackNotification { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action_taken", rename_all = "snake_case")]
pub enum EscalationOutcome {
    DoctorCalled {
        hospital: Facility,
        emergency_notification_id: NotificationId,
        emergency_status: DeliveryStatus,
        notification_id: NotificationId,
        patient_message: String,
    },
    EnhancedNotificationSent {
        notification_id: NotificationId,
        message: String,
        clinic: Option<Facility>,
    },
    StandardNotificationSent {
        notification_id: NotificationId,
        message: String,
    },
    FallbackNotification {
        reason: FallbackReason,
        message: String,
    },
}

impl EscalationOutcome {
    pub fn action_taken(&self) -> &'static str {
        match self {
            Self::DoctorCalled { .. } => "doctor_called",
            Self::EnhancedNotificationSent { .. } => "enhanced_notification_sent",
            Self::StandardNotificationSent { .. } => "standard_notification_sent",
            Self::FallbackNotification { .. } => "fallback_notification",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::DoctorCalled {
                patient_message, ..
            } => patient_message,
            Self::EnhancedNotificationSent { message, .. }
            | Self::StandardNotificationSent { message, .. }
            | Self::FallbackNotification { message, .. } => message,
        }
    }
}

/// Why the normal action was replaced by the fallback notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    NoHospitalAvailable,
    FacilityLookupFailed { detail: String },
    StorageFailed { detail: String },
}

fn storage_failed(err: NotifierError) -> FallbackReason {
    FallbackReason::StorageFailed {
        detail: err.to_string(),
    }
}

/// Assessment persisted together with the patient notification it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedAssessment {
    pub assessment_id: AssessmentId,
    pub notification_id: NotificationId,
    pub message: String,
    pub assessment: RiskAssessment,
}

/// Scoring, messaging, persistence and facility lookup wired together.
pub struct Escalator<W, G, S, F> {
    engine: RiskEngine<W>,
    composer: MessageComposer<G>,
    store: S,
    facilities: F,
}

impl<W, G, S, F> Escalator<W, G, S, F>
where
    W: WeatherLookup,
    G: MessageGenerator,
    S: RecordStore,
    F: FacilityDirectory,
{
    pub fn new(
        engine: RiskEngine<W>,
        composer: MessageComposer<G>,
        store: S,
        facilities: F,
    ) -> Self {
        Self {
            engine,
            composer,
            store,
            facilities,
        }
    }

    pub fn engine(&self) -> &RiskEngine<W> {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Assesses the patient, stores the assessment and sends the patient a
    /// notification tailored to it.
    pub fn record_assessment(
        &mut self,
        patient: &Patient,
    ) -> Result<RecordedAssessment, NotifierError> {
        let assessment = self.engine.assess(patient);
        let context = RiskContext::from_assessment(&assessment, patient.trimester());
        let message = self.composer.compose(patient, &context);

        let assessment_id = self.store.save_assessment(assessment.clone())?;
        let notification = self.store.create_notification(NewNotification {
            patient_id: patient.id,
            message: message.clone(),
            risk_level: assessment.risk_level,
            notification_type: notification_kind(&context),
        })?;

        Ok(RecordedAssessment {
            assessment_id,
            notification_id: notification.id,
            message,
            assessment,
        })
    }

    /// Assesses the patient and runs the action for the resulting level.
    pub fn escalate(&mut self, patient: &Patient) -> EscalationResult {
        let assessment = self.engine.assess(patient);
        let context = RiskContext::from_assessment(&assessment, patient.trimester());
        let risk_level = assessment.risk_level;

        let outcome = match risk_level {
            RiskLevel::High => self.handle_high_risk(patient, &context),
            RiskLevel::Medium => self.handle_medium_risk(patient, &context),
            RiskLevel::Low => self.handle_low_risk(patient, &context),
        }
        .unwrap_or_else(|reason| {
            warn!(
                patient_id = patient.id,
                risk_level = %risk_level,
                ?reason,
                "escalation fell back to generic notification"
            );
            EscalationOutcome::FallbackNotification {
                reason,
                message: fallback_message(patient, risk_level),
            }
        });

        EscalationResult {
            success: true,
            risk_level,
            risk_score: assessment.risk_score,
            outcome,
        }
    }

    /// Records a facility update: a response text is attached, no text marks
    /// the record delivered.
    pub fn respond(
        &mut self,
        id: NotificationId,
        response: Option<&str>,
    ) -> Result<EmergencyNotification, NotifierError> {
        let mut record = self.store.emergency(id)?;
        match response {
            Some(text) => record.add_response(text)?,
            None => record.mark_as_delivered()?,
        }
        self.store.update_emergency(&record)?;
        Ok(record)
    }

    fn handle_high_risk(
        &mut self,
        patient: &Patient,
        context: &RiskContext,
    ) -> Result<EscalationOutcome, FallbackReason> {
        let hospital = self
            .facilities
            .find_facility(FacilityKind::Hospital, true)
            .map_err(|err| FallbackReason::FacilityLookupFailed {
                detail: err.to_string(),
            })?
            .ok_or(FallbackReason::NoHospitalAvailable)?;

        let record = EmergencyNotification::pending(
            patient.id,
            hospital.id,
            RiskLevel::High,
            EmergencyKind::DoctorCall,
            Priority::Critical,
            doctor_call_message(patient, &hospital, Utc::now()),
        );
        let record = self.store.create_emergency(record).map_err(storage_failed)?;
        let record = self.dispatch_doctor_call(record);

        let patient_message = self.composer.compose(patient, context);
        let notification = self
            .store
            .create_notification(NewNotification {
                patient_id: patient.id,
                message: patient_message.clone(),
                risk_level: RiskLevel::High,
                notification_type: notification_kind(context),
            })
            .map_err(storage_failed)?;

        Ok(EscalationOutcome::DoctorCalled {
            hospital,
            emergency_notification_id: record.id,
            emergency_status: record.status,
            notification_id: notification.id,
            patient_message,
        })
    }

    fn handle_medium_risk(
        &mut self,
        patient: &Patient,
        context: &RiskContext,
    ) -> Result<EscalationOutcome, FallbackReason> {
        let message = self.composer.compose(patient, context);
        let notification = self
            .store
            .create_notification(NewNotification {
                patient_id: patient.id,
                message: message.clone(),
                risk_level: RiskLevel::Medium,
                notification_type: notification_kind(context),
            })
            .map_err(storage_failed)?;

        let clinic = match self.facilities.find_facility(FacilityKind::Clinic, true) {
            Ok(clinic) => clinic,
            Err(err) => {
                warn!(patient_id = patient.id, error = %err, "clinic lookup failed");
                None
            }
        };

        Ok(EscalationOutcome::EnhancedNotificationSent {
            notification_id: notification.id,
            message,
            clinic,
        })
    }

    fn handle_low_risk(
        &mut self,
        patient: &Patient,
        context: &RiskContext,
    ) -> Result<EscalationOutcome, FallbackReason> {
        let message = self.composer.compose(patient, context);
        let notification = self
            .store
            .create_notification(NewNotification {
                patient_id: patient.id,
                message: message.clone(),
                risk_level: RiskLevel::Low,
                notification_type: notification_kind(context),
            })
            .map_err(storage_failed)?;

        Ok(EscalationOutcome::StandardNotificationSent {
            notification_id: notification.id,
            message,
        })
    }

    /// Delivery is log-only; a failed status update marks the record failed.
    fn dispatch_doctor_call(&mut self, mut record: EmergencyNotification) -> EmergencyNotification {
        info!(
            emergency_notification_id = record.id,
            health_facility_id = record.health_facility_id,
            "DOCTOR CALL: {}",
            record.message
        );

        let mut sent = record.clone();
        let outcome = sent
            .mark_as_sent()
            .and_then(|()| self.store.update_emergency(&sent));
        match outcome {
            Ok(()) => sent,
            Err(err) => {
                warn!(
                    emergency_notification_id = record.id,
                    error = %err,
                    "doctor call dispatch failed"
                );
                if let Err(err) = record
                    .mark_as_failed()
                    .and_then(|()| self.store.update_emergency(&record))
                {
                    warn!(
                        emergency_notification_id = record.id,
                        error = %err,
                        "could not record failed doctor call"
                    );
                }
                record
            }
        }
    }
}

fn notification_kind(context: &RiskContext) -> NotificationKind {
    if context.heat_wave {
        NotificationKind::HeatWarning
    } else {
        NotificationKind::GeneralHealth
    }
}
