use serde::{Deserialize, Serialize};

pub type FacilityId = u64;

/// Facility category a lookup filters on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Hospital,
    Clinic,
    NursingHome,
}

impl FacilityKind {
    /// Short description codes that belong to this category.
    pub fn codes(self) -> &'static [&'static str] {
        match self {
            Self::Hospital => &["HOSP", "HOSP-EC"],
            Self::Clinic => &["DTC", "HOSP-EC"],
            Self::NursingHome => &["NH"],
        }
    }
}

/// Health facility record as returned by the facility directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Facility {
    pub id: FacilityId,
    #[serde(default)]
    pub facility_id: String,
    pub facility_name: String,
    /// Category code such as `HOSP`, `HOSP-EC`, `DTC` or `NH`.
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub facility_address_1: Option<String>,
    #[serde(default)]
    pub facility_address_2: Option<String>,
    #[serde(default)]
    pub facility_city: Option<String>,
    #[serde(default)]
    pub facility_state: Option<String>,
    #[serde(default)]
    pub facility_zip_code: Option<String>,
    #[serde(default)]
    pub facility_phone_number: Option<String>,
    #[serde(default)]
    pub facility_latitude: Option<f64>,
    #[serde(default)]
    pub facility_longitude: Option<f64>,
}

impl Facility {
    pub fn is_kind(&self, kind: FacilityKind) -> bool {
        self.short_description
            .as_deref()
            .is_some_and(|code| kind.codes().contains(&code))
    }

    pub fn is_hospital(&self) -> bool {
        self.is_kind(FacilityKind::Hospital)
    }

    pub fn is_clinic(&self) -> bool {
        self.is_kind(FacilityKind::Clinic)
    }

    pub fn is_nursing_home(&self) -> bool {
        self.is_kind(FacilityKind::NursingHome)
    }

    pub fn has_phone(&self) -> bool {
        self.facility_phone_number
            .as_deref()
            .is_some_and(|phone| !phone.trim().is_empty())
    }

    pub fn full_address(&self) -> String {
        [
            &self.facility_address_1,
            &self.facility_address_2,
            &self.facility_city,
            &self.facility_state,
            &self.facility_zip_code,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
