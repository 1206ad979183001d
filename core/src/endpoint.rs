//! Data-driven endpoint descriptors.
//!
//! # Design
//! Every remote operation is described by an [`Endpoint`]: an HTTP verb plus
//! a path template with `{name}` placeholders. One expansion routine
//! substitutes percent-encoded parameter values and rejects empty ones, so
//! required-path-parameter validation lives in exactly one place. Both
//! service families instantiate the same descriptor type; their differing
//! conventions (auth, query parameters, body encoding) stay in the clients.

use percent_encoding::utf8_percent_encode;

use crate::error::ApiError;
use crate::http::{HttpMethod, COMPONENT};

/// A remote operation: verb plus path template.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub template: &'static str,
}

impl Endpoint {
    pub const fn new(method: HttpMethod, template: &'static str) -> Self {
        Self { method, template }
    }

    /// Expand the path template against `base_url`, substituting each
    /// `{name}` placeholder with its percent-encoded value from `params`.
    ///
    /// A placeholder whose value is missing or empty yields
    /// [`ApiError::MissingParameter`] carrying the placeholder name.
    pub fn expand(&self, base_url: &str, params: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url = String::with_capacity(base_url.len() + self.template.len());
        url.push_str(base_url.trim_end_matches('/'));

        // Slices of the 'static template keep the 'static lifetime, which
        // lets placeholder names travel inside MissingParameter.
        let mut rest: &'static str = self.template;
        while let Some(start) = rest.find('{') {
            url.push_str(&rest[..start]);
            let Some(close) = rest[start..].find('}') else {
                // Unterminated placeholder: templates are crate constants,
                // treat the remainder as literal.
                url.push_str(&rest[start..]);
                return Ok(url);
            };
            let name = &rest[start + 1..start + close];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .unwrap_or("");
            if value.is_empty() {
                return Err(ApiError::MissingParameter(name));
            }
            url.extend(utf8_percent_encode(value, COMPONENT));
            rest = &rest[start + close + 1..];
        }
        url.push_str(rest);
        Ok(url)
    }
}

/// Reject a required non-path argument that is absent or blank.
pub(crate) fn require(name: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingParameter(name));
    }
    Ok(())
}
