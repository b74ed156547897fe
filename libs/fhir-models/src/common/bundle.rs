//! FHIR Bundle model
//!
//! Version-agnostic model for Bundles that works across R4, R4B, and R5.
//! Entry resources stay as raw JSON; resolving them into typed models is
//! left to the caller.

use super::complex::Meta;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR Bundle resource
///
/// A container for a collection of resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - "Bundle" unless the input says otherwise
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Indicates the purpose of this bundle - how it was intended to be used
    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    /// When the bundle was assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// If search, the total number of matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Vec<BundleLink>>,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,

    /// Additional content beyond core fields (signature, version-specific fields)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

resource_model!(Bundle, "Bundle");

/// Type of Bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
}

/// Links related to this Bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// Entry in the bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in this bundle, in its JSON form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    /// Search, request and response details are kept verbatim
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl BundleEntry {
    pub fn with_resource(full_url: Option<String>, resource: Value) -> Self {
        Self {
            full_url,
            resource: Some(resource),
            extensions: HashMap::new(),
        }
    }

    /// `resourceType` of the contained resource, if any
    pub fn resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.get("resourceType"))
            .and_then(Value::as_str)
    }
}

impl Bundle {
    /// Create a new Bundle with minimal required fields
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            resource_type: default_resource_type(),
            id: None,
            meta: None,
            bundle_type,
            timestamp: None,
            total: None,
            link: None,
            entry: None,
            extensions: HashMap::new(),
        }
    }

    /// Get the number of entries in the bundle
    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }

    /// Get entries as a slice
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entry.get_or_insert_with(Vec::new).push(entry);
    }

    pub fn add_link(&mut self, relation: impl Into<String>, url: impl Into<String>) {
        self.link.get_or_insert_with(Vec::new).push(BundleLink {
            relation: relation.into(),
            url: url.into(),
        });
    }

    /// Entry resources whose `resourceType` equals `resource_type`
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries()
            .iter()
            .filter(move |e| e.resource_type() == Some(resource_type))
            .filter_map(|e| e.resource.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_bundle() {
        let json = json!({
            "resourceType": "Bundle",
            "id": "example-bundle",
            "type": "searchset",
            "total": 1,
            "entry": [
                {
                    "fullUrl": "http://example.org/fhir/Patient/123",
                    "resource": {
                        "resourceType": "Patient",
                        "id": "123"
                    },
                    "search": {
                        "mode": "match",
                        "score": 1.0
                    }
                }
            ]
        });

        let bundle: Bundle = serde_json::from_value(json).unwrap();
        assert_eq!(bundle.id, Some("example-bundle".to_string()));
        assert_eq!(bundle.bundle_type, BundleType::Searchset);
        assert_eq!(bundle.total, Some(1));
        assert_eq!(bundle.entry_count(), 1);
        assert!(bundle.entries()[0].extensions.contains_key("search"));
    }

    #[test]
    fn test_bundle_type_required() {
        let result: Result<Bundle, _> = serde_json::from_value(json!({"resourceType": "Bundle"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_bundle() {
        let bundle = Bundle::new(BundleType::TransactionResponse);
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["resourceType"], "Bundle");
        assert_eq!(json["type"], "transaction-response");
    }

    #[test]
    fn test_resources_of_type() {
        let mut bundle = Bundle::new(BundleType::Collection);
        bundle.add_entry(BundleEntry::with_resource(
            None,
            json!({"resourceType": "Patient", "id": "1"}),
        ));
        bundle.add_entry(BundleEntry::with_resource(
            None,
            json!({"resourceType": "Observation", "id": "2"}),
        ));
        bundle.add_entry(BundleEntry::default());

        let patients: Vec<_> = bundle.resources_of_type("Patient").collect();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0]["id"], "1");
        assert_eq!(bundle.entry_count(), 3);
    }

    #[test]
    fn test_add_link() {
        let mut bundle = Bundle::new(BundleType::Searchset);
        bundle.add_link("self", "http://example.org/fhir/Patient?_id=123");
        assert_eq!(bundle.link.as_ref().unwrap().len(), 1);
        assert_eq!(bundle.link.as_ref().unwrap()[0].relation, "self");
    }
}
