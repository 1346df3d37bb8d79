use crate::request::RequestSpec;

/// Quote a string for a POSIX shell using single quotes
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Format request as a single-line cURL command
pub fn to_curl(spec: &RequestSpec) -> String {
    let mut parts = vec!["curl".to_string()];

    parts.push(format!("-X {}", spec.method.as_str()));
    parts.push(shell_quote(&spec.url));

    for flag in spec.headers.curl_flags() {
        parts.push(format!("-H {}", flag));
    }

    if let Some(body) = &spec.body {
        parts.push(format!("-d {}", shell_quote(body)));
    }

    parts.join(" ")
}
