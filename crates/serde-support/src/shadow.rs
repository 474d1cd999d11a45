//! Helpers for the `_field` shadow objects of FHIR JSON.

use serde::{Deserialize, Serialize};

fn is_empty_slice<E>(extension: &&[E]) -> bool {
    extension.is_empty()
}

/// Helper struct for serializing id and extension metadata for FHIR primitives.
///
/// In FHIR JSON, primitive values can have associated metadata stored in a parallel
/// `_fieldName` object containing an `id` and/or `extension` array.
///
/// # Example
/// ```json
/// {
///   "status": "active",
///   "_status": {
///     "id": "status-1",
///     "extension": [...]
///   }
/// }
/// ```
#[derive(Serialize)]
pub struct IdAndExtensionHelper<'a, E> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: &'a Option<String>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub extension: &'a [E],
}

/// Owned counterpart of [`IdAndExtensionHelper`], used when reading a
/// `_fieldName` object.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdAndExtensionOwned<E> {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "Vec::new")]
    pub extension: Vec<E>,
}

/// Keys allowed inside a shadow object.
pub const SHADOW_KEYS: [&str; 2] = ["id", "extension"];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_helper_skips_empty_parts() {
        let id = None;
        let helper: IdAndExtensionHelper<'_, Value> = IdAndExtensionHelper {
            id: &id,
            extension: &[],
        };
        assert_eq!(serde_json::to_value(&helper).unwrap(), json!({}));

        let id = Some("g1".to_string());
        let extension = vec![json!({"url": "http://example.org/x"})];
        let helper = IdAndExtensionHelper {
            id: &id,
            extension: &extension,
        };
        assert_eq!(
            serde_json::to_value(&helper).unwrap(),
            json!({"id": "g1", "extension": [{"url": "http://example.org/x"}]})
        );
    }

    #[test]
    fn test_owned_defaults() {
        let owned: IdAndExtensionOwned<Value> = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert_eq!(owned.id.as_deref(), Some("a"));
        assert!(owned.extension.is_empty());
    }
}
