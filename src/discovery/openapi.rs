//! OpenAPI/Swagger specification parser

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use serde_json::Value;

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::discovery::models::ApiDocument;
use crate::models::{
    BodyDescriptor, HttpMethod, OperationDescriptor, ParameterDescriptor, ParameterLocation,
    SchemeKind, SecurityScheme,
};

/// Parse an OpenAPI spec file (JSON or YAML by extension)
pub fn parse_openapi(spec_path: &Path) -> Result<ApiDocument> {
    let content = fs::read_to_string(spec_path)?;

    let spec: Value = if spec_path.extension().map(|e| e == "json").unwrap_or(false) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    parse_openapi_value(&spec)
}

/// Parse an already-deserialized OpenAPI 3 or Swagger 2 document
pub fn parse_openapi_value(spec: &Value) -> Result<ApiDocument> {
    let Some(paths) = spec.get("paths").and_then(|p| p.as_object()) else {
        bail!("document has no 'paths' object");
    };

    let mut document = ApiDocument::default();

    if let Some(info) = spec.get("info") {
        document.title = info.get("title").and_then(|v| v.as_str()).map(String::from);
        document.version = info.get("version").and_then(|v| v.as_str()).map(String::from);
    }

    document.servers = if spec.get("swagger").is_some() {
        swagger_servers(spec)
    } else {
        parse_servers(spec.get("servers"))
    };

    document.security_schemes = extract_security_schemes(spec);
    let global_security = security_references(spec.get("security"));
    let global_consumes = string_list(spec.get("consumes"));

    for (path, path_item) in paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        let path_servers = parse_servers(item.get("servers"));
        let path_params: Vec<ParameterDescriptor> = item
            .get("parameters")
            .and_then(|p| p.as_array())
            .map(|params| params.iter().filter_map(|p| parse_parameter(spec, p)).collect())
            .unwrap_or_default();

        for (method, operation) in item {
            let Some(method) = HttpMethod::parse(method) else {
                // Skip non-HTTP method keys like "parameters"
                continue;
            };
            let Some(op) = operation.as_object() else {
                continue;
            };

            let mut descriptor = OperationDescriptor::new(method, path.clone());
            descriptor.operation_id = op.get("operationId").and_then(|v| v.as_str()).map(String::from);
            descriptor.summary = op.get("summary").and_then(|v| v.as_str()).map(String::from);
            descriptor.deprecated = op.get("deprecated").and_then(|v| v.as_bool()).unwrap_or(false);

            // Operation-level parameters win over path-level ones by name
            if let Some(params) = op.get("parameters").and_then(|p| p.as_array()) {
                descriptor.parameters = params.iter().filter_map(|p| parse_parameter(spec, p)).collect();
            }
            for param in &path_params {
                if !descriptor.parameters.iter().any(|p| p.name == param.name) {
                    descriptor.parameters.push(param.clone());
                }
            }

            descriptor.body = match op.get("requestBody") {
                Some(body) => parse_request_body(spec, resolve_ref(spec, body)),
                None => swagger_body(spec, op, &global_consumes),
            };

            let op_servers = parse_servers(op.get("servers"));
            descriptor.servers = if !op_servers.is_empty() {
                op_servers
            } else if !path_servers.is_empty() {
                path_servers.clone()
            } else {
                document.servers.clone()
            };

            // Security (operation-level overrides global)
            descriptor.security = match op.get("security") {
                Some(security) => security_references(Some(security)),
                None => global_security.clone(),
            };

            document.operations.push(descriptor);
        }
    }

    Ok(document)
}

/// Follow a local `$ref` such as `#/components/parameters/Limit`
fn resolve_ref<'a>(spec: &'a Value, value: &'a Value) -> &'a Value {
    match value.get("$ref").and_then(|r| r.as_str()) {
        Some(reference) => reference
            .strip_prefix('#')
            .and_then(|pointer| spec.pointer(pointer))
            .unwrap_or(value),
        None => value,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|i| i.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

/// OpenAPI 3 `servers`, with `{variable}`s replaced by their defaults
fn parse_servers(servers: Option<&Value>) -> Vec<String> {
    let Some(servers) = servers.and_then(|s| s.as_array()) else {
        return Vec::new();
    };
    servers
        .iter()
        .filter_map(|server| {
            let mut url = server.get("url")?.as_str()?.to_string();
            if let Some(vars) = server.get("variables").and_then(|v| v.as_object()) {
                for (name, var) in vars {
                    if let Some(default) = var.get("default").and_then(|d| d.as_str()) {
                        url = url.replace(&format!("{{{}}}", name), default);
                    }
                }
            }
            Some(url)
        })
        .collect()
}

/// Swagger 2 has one base URL assembled from `schemes`, `host` and `basePath`
fn swagger_servers(spec: &Value) -> Vec<String> {
    let Some(host) = spec.get("host").and_then(|h| h.as_str()) else {
        return Vec::new();
    };
    let base_path = spec.get("basePath").and_then(|b| b.as_str()).unwrap_or("");
    let schemes = string_list(spec.get("schemes"));
    let scheme = if schemes.iter().any(|s| s == "https") || schemes.is_empty() {
        "https"
    } else {
        schemes[0].as_str()
    };
    vec![format!("{}://{}{}", scheme, host, base_path.trim_end_matches('/'))]
}

fn extract_security_schemes(spec: &Value) -> Vec<SecurityScheme> {
    let definitions = spec
        .get("components")
        .and_then(|c| c.get("securitySchemes"))
        .or_else(|| spec.get("securityDefinitions")) // OpenAPI 2.0
        .and_then(|s| s.as_object());

    let Some(definitions) = definitions else {
        return Vec::new();
    };

    definitions
        .iter()
        .map(|(id, scheme)| {
            let scheme = resolve_ref(spec, scheme);
            let scheme_type = scheme.get("type").and_then(|t| t.as_str()).unwrap_or("");
            let kind = match scheme_type {
                "http" => match scheme.get("scheme").and_then(|s| s.as_str()) {
                    Some(s) if s.eq_ignore_ascii_case("bearer") => SchemeKind::Bearer,
                    Some(s) if s.eq_ignore_ascii_case("basic") => SchemeKind::Basic,
                    _ => SchemeKind::Named,
                },
                "basic" => SchemeKind::Basic,
                "apiKey" if scheme.get("in").and_then(|i| i.as_str()) == Some("header") => {
                    match scheme.get("name").and_then(|n| n.as_str()) {
                        Some(header) => SchemeKind::ApiKey { header: header.to_string() },
                        None => SchemeKind::Named,
                    }
                }
                "oauth2" | "openIdConnect" => SchemeKind::Bearer,
                _ => SchemeKind::Named,
            };
            SecurityScheme::new(id.clone(), kind)
        })
        .collect()
}

/// Every scheme id named by any requirement object, deduplicated in order
fn security_references(security: Option<&Value>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for requirement in security.and_then(|s| s.as_array()).into_iter().flatten() {
        if let Some(obj) = requirement.as_object() {
            for id in obj.keys() {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
    }
    ids
}

fn parse_parameter(spec: &Value, param: &Value) -> Option<ParameterDescriptor> {
    let param = resolve_ref(spec, param);
    let name = param.get("name")?.as_str()?.to_string();
    let location = match param.get("in")?.as_str()? {
        "path" => ParameterLocation::Path,
        "query" => ParameterLocation::Query,
        "header" => ParameterLocation::Header,
        "cookie" => ParameterLocation::Cookie,
        _ => return None,
    };

    let required = param.get("required").and_then(|r| r.as_bool()).unwrap_or(false);

    let description = param.get("description").and_then(|d| d.as_str()).map(String::from);

    let default = param
        .get("schema")
        .map(|s| resolve_ref(spec, s))
        .and_then(|s| s.get("default"))
        .or_else(|| param.get("default"));
    let value = match default {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Some(ParameterDescriptor {
        name,
        location,
        value,
        required,
        description,
    })
}

fn parse_request_body(spec: &Value, body: &Value) -> Option<BodyDescriptor> {
    let required = body.get("required").and_then(|r| r.as_bool()).unwrap_or(false);
    let content = body.get("content").and_then(|c| c.as_object())?;
    if content.is_empty() {
        return None;
    }

    let media_types: Vec<String> = content.keys().cloned().collect();
    // Prefer application/json
    let active = media_types
        .iter()
        .position(|m| m == DEFAULT_CONTENT_TYPE)
        .unwrap_or(0);
    let example = content
        .get(&media_types[active])
        .and_then(|media| media_example(spec, media))
        .map(example_text);

    Some(BodyDescriptor {
        media_types,
        active,
        example,
        required,
    })
}

/// Swagger 2 declares the body as an `in: body` parameter
fn swagger_body(
    spec: &Value,
    op: &serde_json::Map<String, Value>,
    global_consumes: &[String],
) -> Option<BodyDescriptor> {
    let body_param = op
        .get("parameters")
        .and_then(|p| p.as_array())?
        .iter()
        .map(|p| resolve_ref(spec, p))
        .find(|p| p.get("in").and_then(|i| i.as_str()) == Some("body"))?;

    let mut media_types = string_list(op.get("consumes"));
    if media_types.is_empty() {
        media_types = global_consumes.to_vec();
    }
    if media_types.is_empty() {
        media_types.push(DEFAULT_CONTENT_TYPE.to_string());
    }
    let active = media_types
        .iter()
        .position(|m| m == DEFAULT_CONTENT_TYPE)
        .unwrap_or(0);

    let example = body_param
        .get("schema")
        .map(|s| resolve_ref(spec, s))
        .and_then(|s| s.get("example"))
        .map(example_text);

    Some(BodyDescriptor {
        media_types,
        active,
        example,
        required: body_param.get("required").and_then(|r| r.as_bool()).unwrap_or(false),
    })
}

fn media_example<'a>(spec: &'a Value, media: &'a Value) -> Option<&'a Value> {
    media
        .get("example")
        .or_else(|| {
            media
                .get("schema")
                .map(|s| resolve_ref(spec, s))
                .and_then(|s| s.get("example"))
        })
        .or_else(|| {
            media
                .get("examples")
                .and_then(|e| e.as_object())
                .and_then(|examples| examples.values().next())
                .map(|e| resolve_ref(spec, e))
                .and_then(|e| e.get("value"))
        })
}

fn example_text(example: &Value) -> String {
    match example {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}
