//! Pregnancy risk scoring and tiered notification escalation.
//!
//! [`RiskEngine`] turns a [`Patient`](notifier_core::Patient) into a
//! [`RiskAssessment`](notifier_core::RiskAssessment); [`Escalator`] maps the
//! assessed level to a patient message, a clinic referral or a doctor call.

pub mod escalation;
pub mod message;
pub mod risk;
pub mod store;
pub mod tables;
pub mod weather;

pub use escalation::{
    EscalationOutcome, EscalationResult, Escalator, FallbackReason, RecordedAssessment,
};
pub use message::{MessageComposer, MessageGenerator, NoGenerator, RiskContext};
pub use risk::RiskEngine;
pub use store::{
    AssessmentId, EmergencyStats, FacilityDirectory, InMemoryDirectory, InMemoryStore,
    RecordStore, StoredAssessment,
};
pub use weather::{heat_index_celsius, FixedWeather, NoWeather, WeatherLookup};
