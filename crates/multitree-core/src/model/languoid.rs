use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::language::LanguageId;

/// The Glottolog namespace holding MultiTree names and identifiers.
pub const MULTITREE_NAMESPACE: &str = "multitree";

/// A languoid record from the Glottolog catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLanguoid {
    /// Glottocode.
    #[serde(rename = "id")]
    pub glottocode: String,

    pub name: String,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Alternative names keyed by provider namespace.
    #[serde(default)]
    pub names: BTreeMap<String, Vec<String>>,

    /// Cross-reference identifiers keyed by provider namespace.
    #[serde(default, rename = "identifier")]
    pub identifiers: BTreeMap<String, String>,
}

impl ExternalLanguoid {
    #[must_use]
    pub fn new(glottocode: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            glottocode: glottocode.into(),
            name: name.into(),
            latitude: None,
            longitude: None,
            names: BTreeMap::new(),
            identifiers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    #[must_use]
    pub fn with_name(mut self, namespace: &str, name: impl Into<String>) -> Self {
        self.names
            .entry(namespace.to_string())
            .or_default()
            .push(name.into());
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, namespace: &str, id: impl Into<String>) -> Self {
        self.identifiers.insert(namespace.to_string(), id.into());
        self
    }

    /// Alternative names in `namespace`, empty if there are none.
    #[must_use]
    pub fn names_in(&self, namespace: &str) -> &[String] {
        self.names
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn identifier_in(&self, namespace: &str) -> Option<&str> {
        self.identifiers.get(namespace).map(String::as_str)
    }
}

/// How a language identifier was matched to Glottolog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// Via a `multitree` identifier recorded in Glottolog.
    Identifier,
    /// Via a transliterated `multitree` alternative name.
    Name,
}

/// The Glottolog data copied onto a matched language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlottologMatch {
    pub glottocode: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub matched_by: MatchKind,
}

impl GlottologMatch {
    #[must_use]
    pub fn from_languoid(languoid: &ExternalLanguoid, matched_by: MatchKind) -> Self {
        Self {
            glottocode: languoid.glottocode.clone(),
            name: languoid.name.clone(),
            latitude: languoid.latitude,
            longitude: languoid.longitude,
            matched_by,
        }
    }
}

/// A row of the language table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRecord {
    pub id: LanguageId,
    pub glottolog: Option<GlottologMatch>,
}

impl LanguageRecord {
    #[must_use]
    pub fn unresolved(id: LanguageId) -> Self {
        Self {
            id,
            glottolog: None,
        }
    }

    /// Glottolog's name when matched, else the identifier itself.
    #[must_use]
    pub fn name(&self) -> &str {
        self.glottolog
            .as_ref()
            .map_or(self.id.as_str(), |m| m.name.as_str())
    }

    #[must_use]
    pub fn glottocode(&self) -> Option<&str> {
        self.glottolog.as_ref().map(|m| m.glottocode.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languoid_namespaces() {
        let languoid = ExternalLanguoid::new("haus1257", "Hausa")
            .with_name(MULTITREE_NAMESPACE, "Hausa")
            .with_name(MULTITREE_NAMESPACE, "Haoussa")
            .with_name("wals", "Hausa")
            .with_identifier(MULTITREE_NAMESPACE, "hau");

        assert_eq!(languoid.names_in(MULTITREE_NAMESPACE).len(), 2);
        assert!(languoid.names_in("ethnologue").is_empty());
        assert_eq!(languoid.identifier_in(MULTITREE_NAMESPACE), Some("hau"));
        assert_eq!(languoid.identifier_in("wals"), None);
    }

    #[test]
    fn test_languoid_deserialize_snapshot_shape() {
        let json = r#"{
            "id": "haus1257",
            "name": "Hausa",
            "latitude": 11.7,
            "longitude": 8.9,
            "names": {"multitree": ["Hausa"]},
            "identifier": {"multitree": "hau"}
        }"#;
        let languoid: ExternalLanguoid = serde_json::from_str(json).unwrap();
        assert_eq!(languoid.glottocode, "haus1257");
        assert_eq!(languoid.identifier_in(MULTITREE_NAMESPACE), Some("hau"));
    }

    #[test]
    fn test_language_record_name_fallback() {
        let id = LanguageId::normalize("hau").unwrap();
        let record = LanguageRecord::unresolved(id.clone());
        assert_eq!(record.name(), "hau");
        assert!(record.glottocode().is_none());

        let languoid = ExternalLanguoid::new("haus1257", "Hausa").with_coordinates(11.7, 8.9);
        let record = LanguageRecord {
            id,
            glottolog: Some(GlottologMatch::from_languoid(&languoid, MatchKind::Identifier)),
        };
        assert_eq!(record.name(), "Hausa");
        assert_eq!(record.glottocode(), Some("haus1257"));
    }
}
