//! FHIR Observation model
//!
//! Version-agnostic model for Observations (measurements and simple assertions)

use super::complex::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR Observation resource
///
/// `status` and `code` are required; deserialization fails without them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Resource type - "Observation" unless the input says otherwise
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Business identifier for observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// registered | preliminary | final | amended +
    pub status: ObservationStatus,

    /// Classification of type of observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodeableConcept>>,

    /// Type of observation (code / type)
    pub code: CodeableConcept,

    /// Who and/or what the observation is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Clinically relevant time/time-period for observation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,

    /// Date/Time this version was made available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Vec<Reference>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    /// High, low, normal, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Vec<CodeableConcept>>,

    /// Component results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Vec<ObservationComponent>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Observation".to_string()
}

resource_model!(Observation, "Observation");

/// Status of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
    Corrected,
    Cancelled,
    EnteredInError,
    Unknown,
}

/// Component results of a multi-part observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationComponent {
    /// Type of component observation (code / type)
    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Observation {
    /// Create a new Observation with minimal required fields
    pub fn new(status: ObservationStatus, code: CodeableConcept) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            identifier: None,
            status,
            category: None,
            code,
            subject: None,
            encounter: None,
            effective_date_time: None,
            effective_period: None,
            issued: None,
            performer: None,
            value_quantity: None,
            value_codeable_concept: None,
            value_string: None,
            value_boolean: None,
            interpretation: None,
            component: None,
            extensions: HashMap::new(),
        }
    }

    /// Check if the result is final or amended
    pub fn is_final(&self) -> bool {
        matches!(
            self.status,
            ObservationStatus::Final | ObservationStatus::Amended | ObservationStatus::Corrected
        )
    }

    /// Get components as a slice
    pub fn components(&self) -> &[ObservationComponent] {
        self.component.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ResourceModel;
    use serde_json::json;

    #[test]
    fn test_deserialize_observation() {
        let json = json!({
            "resourceType": "Observation",
            "id": "heart-rate",
            "status": "final",
            "code": {"coding": [{"system": "http://loinc.org", "code": "8867-4"}]},
            "subject": {"reference": "Patient/example"},
            "effectiveDateTime": "1999-07-02",
            "valueQuantity": {"value": 44, "unit": "beats/minute", "system": "http://unitsofmeasure.org", "code": "/min"}
        });

        let obs: Observation = serde_json::from_value(json).unwrap();
        assert_eq!(obs.status, ObservationStatus::Final);
        assert!(obs.code.has_coding("http://loinc.org", "8867-4"));
        assert_eq!(obs.value_quantity.as_ref().unwrap().value, Some(44.0));
        assert!(obs.is_final());
    }

    #[test]
    fn test_status_required() {
        let result = Observation::from_value(json!({
            "resourceType": "Observation",
            "code": {"text": "weight"}
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_entered_in_error_status() {
        let obs = Observation::from_value(json!({
            "status": "entered-in-error",
            "code": {"text": "weight"}
        }))
        .unwrap();
        assert_eq!(obs.status, ObservationStatus::EnteredInError);
        assert!(!obs.is_final());
    }

    #[test]
    fn test_serialize_components() {
        let mut obs = Observation::new(
            ObservationStatus::Final,
            CodeableConcept::from_coding(Coding::new("http://loinc.org", "85354-9")),
        );
        obs.component = Some(vec![ObservationComponent {
            code: CodeableConcept::from_coding(Coding::new("http://loinc.org", "8480-6")),
            value_quantity: Some(Quantity {
                value: Some(107.0),
                unit: Some("mmHg".to_string()),
                ..Default::default()
            }),
            value_codeable_concept: None,
            value_string: None,
            extensions: HashMap::new(),
        }]);

        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["resourceType"], "Observation");
        assert_eq!(json["status"], "final");
        assert_eq!(json["component"][0]["valueQuantity"]["unit"], "mmHg");
        assert_eq!(obs.components().len(), 1);
    }
}
