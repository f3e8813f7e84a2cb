// src/middleware/cors.rs

use crate::router::RouterResponse;

/// Origins on the allow-list get their own origin echoed back; everyone else
/// receives a wildcard.
pub fn allow_origin_value(origin: Option<&str>, allowed_origins: &[String]) -> String {
    match origin {
        Some(origin) if allowed_origins.iter().any(|allowed| allowed == origin) => {
            origin.to_string()
        }
        _ => "*".to_string(),
    }
}

/// Add CORS headers to a response
pub fn apply_cors(
    mut response: RouterResponse,
    origin: Option<&str>,
    allowed_origins: &[String],
) -> RouterResponse {
    response.headers.push((
        "Access-Control-Allow-Origin".to_string(),
        allow_origin_value(origin, allowed_origins),
    ));
    response
}

/// Handle CORS preflight requests
pub fn preflight_response(origin: Option<&str>, allowed_origins: &[String]) -> RouterResponse {
    RouterResponse {
        status: 204,
        headers: vec![
            (
                "Access-Control-Allow-Origin".to_string(),
                allow_origin_value(origin, allowed_origins),
            ),
            (
                "Access-Control-Allow-Methods".to_string(),
                "GET, POST, OPTIONS".to_string(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                "Content-Type".to_string(),
            ),
            ("Access-Control-Max-Age".to_string(), "86400".to_string()),
        ],
        body: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> Vec<String> {
        vec!["http://localhost:5173".to_string()]
    }

    #[test]
    fn test_allow_listed_origin_is_echoed() {
        assert_eq!(
            allow_origin_value(Some("http://localhost:5173"), &allow_list()),
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_other_origins_get_wildcard() {
        assert_eq!(
            allow_origin_value(Some("https://evil.example"), &allow_list()),
            "*"
        );
        assert_eq!(allow_origin_value(None, &allow_list()), "*");
    }

    #[test]
    fn test_preflight_shape() {
        let response = preflight_response(Some("http://localhost:5173"), &allow_list());
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
        let methods = response
            .headers
            .iter()
            .find(|(k, _)| k == "Access-Control-Allow-Methods")
            .map(|(_, v)| v.as_str());
        assert_eq!(methods, Some("GET, POST, OPTIONS"));
        let max_age = response
            .headers
            .iter()
            .find(|(k, _)| k == "Access-Control-Max-Age")
            .map(|(_, v)| v.as_str());
        assert_eq!(max_age, Some("86400"));
    }
}
