use serde_json::Value as JsonValue;

use crate::errors::HelmDenoError;

/// What makes a rendered resource addressable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

pub fn resource_identity(resource: &JsonValue) -> Result<ResourceIdentity, HelmDenoError> {
    let kind = non_empty_str(resource.get("kind"));
    let metadata = resource.get("metadata");
    let name = non_empty_str(metadata.and_then(|m| m.get("name")));
    let namespace = non_empty_str(metadata.and_then(|m| m.get("namespace")));

    match (kind, name) {
        (Some(kind), Some(name)) => Ok(ResourceIdentity {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        }),
        (kind, name) => Err(HelmDenoError::BadManifest {
            kind: describe(kind, resource.get("kind")),
            name: describe(name, metadata.and_then(|m| m.get("name"))),
            namespace: describe(namespace, metadata.and_then(|m| m.get("namespace"))),
        }),
    }
}

pub fn validate_resources(resources: &[JsonValue]) -> Result<Vec<ResourceIdentity>, HelmDenoError> {
    resources.iter().map(resource_identity).collect()
}

fn non_empty_str(value: Option<&JsonValue>) -> Option<&str> {
    value.and_then(JsonValue::as_str).filter(|s| !s.is_empty())
}

fn describe(found: Option<&str>, raw: Option<&JsonValue>) -> String {
    match (found, raw) {
        (Some(s), _) => s.to_string(),
        (None, None) | (None, Some(JsonValue::Null)) => "<none>".to_string(),
        (None, Some(other)) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_with_namespace() {
        let identity = resource_identity(&json!({
            "kind": "Service",
            "metadata": { "name": "web", "namespace": "prod" }
        }))
        .unwrap();

        assert_eq!(
            identity,
            ResourceIdentity {
                kind: "Service".to_string(),
                name: "web".to_string(),
                namespace: Some("prod".to_string()),
            }
        );
    }

    #[test]
    fn test_namespace_is_optional() {
        let identity =
            resource_identity(&json!({ "kind": "ServiceAccount", "metadata": { "name": "sa" } }))
                .unwrap();
        assert_eq!(identity.namespace, None);
    }

    #[test]
    fn test_missing_name_is_a_bad_manifest() {
        let err = resource_identity(&json!({
            "kind": "Deployment",
            "metadata": { "namespace": "prod" }
        }))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Bad manifest: kind=Deployment, name=<none>, namespace=prod"
        );
    }

    #[test]
    fn test_missing_kind_is_a_bad_manifest() {
        let err = resource_identity(&json!({ "metadata": { "name": "x" } })).unwrap_err();
        assert_eq!(err.to_string(), "Bad manifest: kind=<none>, name=x, namespace=<none>");
    }

    #[test]
    fn test_non_object_is_a_bad_manifest() {
        assert!(resource_identity(&json!("kind: Service")).is_err());
        assert!(resource_identity(&json!(null)).is_err());
    }

    #[test]
    fn test_wrongly_typed_name_is_reported_verbatim() {
        let err = resource_identity(&json!({ "kind": "Service", "metadata": { "name": 42 } }))
            .unwrap_err();
        assert!(err.to_string().contains("name=42"));
    }

    #[test]
    fn test_validate_resources_stops_at_first_bad_one() {
        let resources = vec![
            json!({ "kind": "Service", "metadata": { "name": "a" } }),
            json!({ "kind": "Service", "metadata": {} }),
        ];
        assert!(validate_resources(&resources).is_err());
        assert_eq!(validate_resources(&resources[..1]).unwrap().len(), 1);
    }
}
