//! Statically declared services, as read from their `_details` documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Contents of a `<root>/<service>/_details` document.
///
/// Only `image` is interpreted here. Every other field is preserved untouched so the
/// document can be shared with other readers of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetails {
    /// Container image the service is expected to run. Empty when not declared.
    #[serde(default)]
    pub image: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A logical service declared ahead of any instance traffic.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredService {
    service_name: String,
    details: ServiceDetails,
}

impl DeclaredService {
    pub fn new(service_name: impl Into<String>, details: ServiceDetails) -> Self {
        Self {
            service_name: service_name.into(),
            details,
        }
    }

    /// Decodes a `_details` document for the named service.
    pub fn from_json(service_name: &str, document: &str) -> serde_json::Result<Self> {
        let details: ServiceDetails = serde_json::from_str(document)?;
        Ok(Self::new(service_name, details))
    }

    pub fn get_service_name(&self) -> &str {
        &self.service_name
    }

    pub fn get_image(&self) -> &str {
        &self.details.image
    }

    pub fn get_details(&self) -> &ServiceDetails {
        &self.details
    }

    /// Re-encodes the `_details` document, unknown fields included.
    pub fn details_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_keep_unknown_fields() {
        let service =
            DeclaredService::from_json("web", r#"{"image":"myorg/web","protocol":"http"}"#)
                .unwrap();
        assert_eq!(service.get_service_name(), "web");
        assert_eq!(service.get_image(), "myorg/web");
        assert_eq!(
            service.get_details().extra.get("protocol"),
            Some(&Value::String("http".into()))
        );
    }

    #[test]
    fn test_details_json_keeps_declared_fields() {
        let service =
            DeclaredService::from_json("web", r#"{"image":"myorg/web","protocol":"http"}"#)
                .unwrap();
        let encoded: Value = serde_json::from_str(&service.details_json().unwrap()).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({"image": "myorg/web", "protocol": "http"})
        );
    }

    #[test]
    fn test_missing_image_decodes_as_empty() {
        let service = DeclaredService::from_json("db", r#"{"port":5432}"#).unwrap();
        assert_eq!(service.get_image(), "");
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        assert!(DeclaredService::from_json("web", "not-json").is_err());
        assert!(DeclaredService::from_json("web", r#""myorg/web""#).is_err());
    }
}
