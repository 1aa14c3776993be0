//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID to a specific attribute in state
///
/// This is useful for simple resources where the import ID maps directly to
/// a single attribute in the resource state.
///
/// Example: ID "5b1c…" -> state.uuid = "5b1c…"
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    tracing::debug!("Importing {} from id {:?}", request.type_name, request.id);
    if request.id.is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Unexpected Import Identifier",
                format!("Expected a non-empty import identifier for {}", attr_path),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    let mut state = DynamicValue::object();
    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!("Could not set attribute '{}' to value '{}'", attr_path, request.id),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

/// Splits a composite import ID across several attributes
///
/// The ID must consist of exactly one non-empty part per attribute, joined
/// by `separator`. Example with `[environment_key, feature_name]` and `,`:
/// ID "abc,my_flag" -> state.environment_key = "abc", state.feature_name = "my_flag"
pub fn import_state_composite_id(
    _ctx: &Context,
    attr_paths: &[AttributePath],
    separator: char,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    tracing::debug!("Importing {} from composite id {:?}", request.type_name, request.id);
    let parts: Vec<&str> = request.id.split(separator).collect();

    if parts.len() != attr_paths.len() || parts.iter().any(|p| p.is_empty()) {
        let separator = separator.to_string();
        let format = attr_paths
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator.as_str());
        response.diagnostics.push(Diagnostic::error(
            "Unexpected Import Identifier",
            format!(
                "Expected import identifier with format: {} Got: {:?}",
                format, request.id
            ),
        ));
        return;
    }

    let mut state = DynamicValue::object();
    for (path, part) in attr_paths.iter().zip(parts) {
        if let Err(e) = state.set_string(path, part.to_string()) {
            response.diagnostics.push(
                Diagnostic::error(
                    format!("Failed to set import ID: {}", e),
                    format!("Could not set attribute '{}' to value '{}'", path, part),
                )
                .with_attribute(path.clone()),
            );
            return;
        }
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "test_resource".to_string(),
            id: id.to_string(),
        }
    }

    fn empty_response() -> ImportResourceStateResponse {
        ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        }
    }

    fn key_paths() -> Vec<AttributePath> {
        vec![
            AttributePath::new("environment_key"),
            AttributePath::new("feature_name"),
        ]
    }

    #[test]
    fn passthrough_sets_attribute() {
        let mut response = empty_response();
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("uuid"),
            &request("abc-123"),
            &mut response,
        );

        assert!(response.diagnostics.is_empty());
        let imported = &response.imported_resources[0];
        assert_eq!(imported.type_name, "test_resource");
        assert_eq!(
            imported.state.get_string(&AttributePath::new("uuid")).unwrap(),
            "abc-123"
        );
    }

    #[test]
    fn passthrough_rejects_empty_id() {
        let mut response = empty_response();
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("uuid"),
            &request(""),
            &mut response,
        );

        assert!(response.imported_resources.is_empty());
        assert_eq!(response.diagnostics[0].summary, "Unexpected Import Identifier");
    }

    #[test]
    fn composite_id_splits_into_attributes() {
        let mut response = empty_response();
        import_state_composite_id(
            &Context::new(),
            &key_paths(),
            ',',
            &request("env_key,my_feature"),
            &mut response,
        );

        assert!(response.diagnostics.is_empty());
        let state = &response.imported_resources[0].state;
        assert_eq!(
            state.get_string(&AttributePath::new("environment_key")).unwrap(),
            "env_key"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("feature_name")).unwrap(),
            "my_feature"
        );
    }

    #[test]
    fn composite_id_rejects_malformed_ids() {
        for id in ["env_key", "env_key,", ",my_feature", "a,b,c", ""] {
            let mut response = empty_response();
            import_state_composite_id(
                &Context::new(),
                &key_paths(),
                ',',
                &request(id),
                &mut response,
            );

            assert!(response.imported_resources.is_empty(), "accepted {:?}", id);
            assert_eq!(response.diagnostics.len(), 1);
            assert!(response.diagnostics[0]
                .detail
                .contains("environment_key,feature_name"));
        }
    }
}
