use crate::notification::DeliveryStatus;

/// Errors raised by the notifier components and their collaborators.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Weather lookup unavailable: {0}")]
    WeatherUnavailable(String),
    #[error("Message generation unavailable: {0}")]
    MessageUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Facility lookup failed: {0}")]
    FacilityLookup(String),
    #[error("Cannot move emergency notification from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    #[error("Cannot attach a response to a {0} emergency notification")]
    ResponseRejected(DeliveryStatus),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("Could not parse data: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
