//! Domain model for pregnancy risk assessment and escalation records.

mod assessment;
mod config;
mod error;
mod facility;
mod notification;
mod patient;

pub use assessment::{
    risk_percentage, FactorScore, RiskAssessment, RiskFactors, RiskLevel, WeatherSnapshot,
    WeatherSource,
};
pub use config::{MessageConfig, NotifierConfig, ScoringConfig, WeatherConfig};
pub use error::NotifierError;
pub use facility::{Facility, FacilityId, FacilityKind};
pub use notification::{
    DeliveryStatus, EmergencyKind, EmergencyNotification, NewNotification, Notification,
    NotificationId, NotificationKind, Priority,
};
pub use patient::{Patient, PatientId, Trimester};
