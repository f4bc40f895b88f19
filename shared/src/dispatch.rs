//! Responder catalog and the outbound dispatch seam.
//!
//! The staged "connections" shown after activation are driven entirely by
//! timers in the app; nothing here performs I/O. `ResponderDispatch` is the
//! port a real deployment would implement to reach the configured
//! integrations.

use serde::{Deserialize, Serialize};

use crate::catalog::{BodyPart, EmergencyType, Symptom};
use crate::config::{AppConfig, Integration};
use crate::model::EmergencyDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Medical,
    Ambulance,
    Family,
}

impl ServiceCategory {
    /// Integration that would receive the dispatch for this kind of responder.
    #[must_use]
    pub const fn integration(self) -> Integration {
        match self {
            Self::Medical => Integration::Hospital,
            Self::Ambulance => Integration::Ambulance,
            Self::Family => Integration::Telecom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Connected,
    Notified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponderService {
    pub id: u32,
    pub name: &'static str,
    pub specialty: &'static str,
    pub category: ServiceCategory,
    pub status: ServiceStatus,
    pub delay_ms: u64,
}

/// Ordered by delay; the connection order on screen follows this order.
pub const RESPONDERS: [ResponderService; 3] = [
    ResponderService {
        id: 1,
        name: "Emergency Doctor",
        specialty: "General Medicine",
        category: ServiceCategory::Medical,
        status: ServiceStatus::Connected,
        delay_ms: 500,
    },
    ResponderService {
        id: 2,
        name: "Ambulance Unit",
        specialty: "Mobile ICU",
        category: ServiceCategory::Ambulance,
        status: ServiceStatus::Connected,
        delay_ms: 800,
    },
    ResponderService {
        id: 3,
        name: "Emergency Contact",
        specialty: "Family",
        category: ServiceCategory::Family,
        status: ServiceStatus::Notified,
        delay_ms: 1000,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedService {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    pub category: ServiceCategory,
    pub status: ServiceStatus,
}

impl From<&ResponderService> for ConnectedService {
    fn from(service: &ResponderService) -> Self {
        Self {
            id: service.id,
            name: service.name.to_string(),
            specialty: service.specialty.to_string(),
            category: service.category,
            status: service.status,
        }
    }
}

// --- Coordinate: validated, NaN-safe ---

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid coordinate: lat={0}, lng={1}")]
    InvalidCoordinate(f64, f64),
    #[error("no endpoint configured for {0:?}")]
    MissingEndpoint(Integration),
    #[error("responder rejected dispatch: {0}")]
    Rejected(String),
    #[error("responder unreachable: {0}")]
    Unreachable(String),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, DispatchError> {
        if !lat.is_finite()
            || !lng.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(DispatchError::InvalidCoordinate(lat, lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Coordinate {}

/// Everything a responder integration would need about one emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub service_id: u32,
    pub endpoint: String,
    pub kind: Option<EmergencyType>,
    pub body_part: Option<BodyPart>,
    pub symptoms: Vec<Symptom>,
    pub description: String,
    pub attachment_count: usize,
    pub location: Option<Coordinate>,
}

impl DispatchRequest {
    pub fn new(
        service: &ResponderService,
        draft: &EmergencyDraft,
        config: &AppConfig,
        location: Option<Coordinate>,
    ) -> Result<Self, DispatchError> {
        let integration = service.category.integration();
        let endpoint = config
            .endpoint(integration)
            .ok_or(DispatchError::MissingEndpoint(integration))?;
        // Location only leaves the device when sharing is switched on.
        let location = location.filter(|_| config.emergency.auto_location_sharing);
        Ok(Self {
            service_id: service.id,
            endpoint: endpoint.to_string(),
            kind: draft.kind,
            body_part: draft.body_part,
            symptoms: draft.symptoms.iter().copied().collect(),
            description: draft.description.as_str().to_string(),
            attachment_count: draft.attachments.len(),
            location,
        })
    }
}

/// Outbound seam to real responder services. No implementation ships with
/// the core; shells or servers provide one.
pub trait ResponderDispatch: Send + Sync {
    fn dispatch(&self, request: &DispatchRequest) -> Result<ServiceStatus, DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<DispatchRequest>>,
    }

    impl ResponderDispatch for RecordingDispatcher {
        fn dispatch(&self, request: &DispatchRequest) -> Result<ServiceStatus, DispatchError> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(ServiceStatus::Connected)
        }
    }

    #[test]
    fn catalog_is_ordered_by_delay() {
        let delays: Vec<u64> = RESPONDERS.iter().map(|r| r.delay_ms).collect();
        assert_eq!(delays, vec![500, 800, 1000]);
        assert_eq!(RESPONDERS[2].status, ServiceStatus::Notified);
    }

    #[test]
    fn coordinate_rejects_nan_and_out_of_range() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(51.5, -0.12).is_ok());
    }

    #[test]
    fn request_carries_draft_and_endpoint() {
        let mut draft = EmergencyDraft::default();
        draft.kind = Some(EmergencyType::Medical);
        draft.body_part = Some(BodyPart::Head);
        draft.toggle_symptom(Symptom::Bleeding);
        let config = AppConfig::default();
        let here = Coordinate::new(10.0, 20.0).ok();

        let request = DispatchRequest::new(&RESPONDERS[1], &draft, &config, here).unwrap();
        assert_eq!(request.endpoint, "https://api.ambulance.example.com");
        assert_eq!(request.symptoms, vec![Symptom::Bleeding]);
        assert_eq!(request.location, here);

        let dispatcher = RecordingDispatcher::default();
        assert_eq!(dispatcher.dispatch(&request), Ok(ServiceStatus::Connected));
        assert_eq!(dispatcher.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn location_withheld_when_sharing_disabled() {
        let mut config = AppConfig::default();
        config.emergency.auto_location_sharing = false;
        let request = DispatchRequest::new(
            &RESPONDERS[0],
            &EmergencyDraft::default(),
            &config,
            Coordinate::new(1.0, 1.0).ok(),
        )
        .unwrap();
        assert_eq!(request.location, None);
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let mut config = AppConfig::default();
        config.integrations.remove(&Integration::Telecom);
        let err = DispatchRequest::new(&RESPONDERS[2], &EmergencyDraft::default(), &config, None)
            .unwrap_err();
        assert_eq!(err, DispatchError::MissingEndpoint(Integration::Telecom));
    }
}
