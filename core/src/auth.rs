//! Credentials attached to outgoing requests.
//!
//! # Design
//! Credentials are plain config passed at client construction and held
//! immutably — there is no process-wide key state. The two service families
//! authenticate differently: the legacy family sends an `apikey` query
//! parameter, the newer family a bearer token header. `apply` is the single
//! place that difference is encoded.

use crate::http::HttpRequest;

/// How a client authenticates against its service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Legacy family: key sent as the `apikey` query parameter.
    ApiKey(String),

    /// Newer family: token sent as an `Authorization: Bearer` header.
    BearerToken(String),
}

impl Credentials {
    /// Attach these credentials to `request`.
    pub fn apply(&self, request: &mut HttpRequest) {
        match self {
            Credentials::ApiKey(key) => {
                request
                    .query
                    .push(("apikey".to_string(), key.clone()));
            }
            Credentials::BearerToken(token) => {
                request
                    .headers
                    .push(("authorization".to_string(), format!("Bearer {token}")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn api_key_becomes_query_parameter() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://localhost/calls".to_string());
        Credentials::ApiKey("k-123".to_string()).apply(&mut req);
        assert_eq!(req.query, vec![("apikey".to_string(), "k-123".to_string())]);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn bearer_token_becomes_authorization_header() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://localhost/v2".to_string());
        Credentials::BearerToken("tok".to_string()).apply(&mut req);
        assert_eq!(
            req.headers,
            vec![("authorization".to_string(), "Bearer tok".to_string())]
        );
        assert!(req.query.is_empty());
    }
}
