//! Path template resolution
//!
//! `/pets/{id}` plus a path parameter `id=7` becomes `/pets/7`. Resolution is
//! all-or-nothing: any placeholder left over aborts the send.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::MissingParameterError;
use crate::models::{ParameterDescriptor, ParameterLocation};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("valid placeholder regex"))
}

/// Substitute every `{name}` whose path parameter has a non-empty value.
///
/// Each name is substituted in a single pass over the template. Values are
/// inserted verbatim. Parameters whose location is not `path` are ignored.
pub fn resolve_path(
    template: &str,
    parameters: &[ParameterDescriptor],
) -> Result<String, MissingParameterError> {
    let mut resolved = template.to_string();

    for param in parameters.iter().filter(|p| p.location == ParameterLocation::Path) {
        if param.value.is_empty() {
            continue;
        }
        let needle = format!("{{{}}}", param.name);
        if resolved.contains(&needle) {
            resolved = resolved.replace(&needle, &param.value);
        }
    }

    if resolved.contains('{') {
        let unresolved = placeholder_regex()
            .captures_iter(&resolved)
            .map(|c| c[1].to_string())
            .collect();
        return Err(MissingParameterError {
            template: template.to_string(),
            unresolved,
            parameters: parameters.to_vec(),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_placeholder() {
        let params = vec![
            ParameterDescriptor::path("owner", "alice"),
            ParameterDescriptor::path("id", "42"),
        ];
        let path = resolve_path("/owners/{owner}/pets/{id}", &params).unwrap();
        assert_eq!(path, "/owners/alice/pets/42");
        assert!(!path.contains('{') && !path.contains('}'));
    }

    #[test]
    fn missing_parameter_fails() {
        let err = resolve_path("/pets/{id}", &[]).unwrap_err();
        assert_eq!(err.template, "/pets/{id}");
        assert_eq!(err.unresolved, vec!["id".to_string()]);
    }

    #[test]
    fn empty_value_leaves_placeholder_unresolved() {
        let params = vec![ParameterDescriptor::path("id", "")];
        let err = resolve_path("/pets/{id}", &params).unwrap_err();
        assert_eq!(err.parameters, params);
    }

    #[test]
    fn query_parameter_with_same_name_is_not_used() {
        let params = vec![ParameterDescriptor::query("id", "7")];
        assert!(resolve_path("/pets/{id}", &params).is_err());
    }

    #[test]
    fn repeated_placeholder_is_replaced_everywhere() {
        let params = vec![ParameterDescriptor::path("v", "x")];
        assert_eq!(resolve_path("/{v}/{v}", &params).unwrap(), "/x/x");
    }

    #[test]
    fn reports_all_unresolved_names() {
        let params = vec![ParameterDescriptor::path("a", "1")];
        let err = resolve_path("/{a}/{b}/{c}", &params).unwrap_err();
        assert_eq!(err.unresolved, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        assert_eq!(resolve_path("/health", &[]).unwrap(), "/health");
    }
}
