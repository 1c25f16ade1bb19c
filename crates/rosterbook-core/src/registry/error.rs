//! Error type for the HTTP person-registry client.

use thiserror::Error;

use crate::error::RosterError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Registry server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),
}

/// Cap on response bodies echoed into error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        // Back off to a char boundary; bodies are not guaranteed ASCII
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::PersonNotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

/// Registry failures are dependency errors in the domain taxonomy; the
/// client maps 404s on id lookups to `NotFound` itself, where the id is
/// known.
impl From<ApiError> for RosterError {
    fn from(err: ApiError) -> Self {
        RosterError::Dependency(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        let status = reqwest::StatusCode::from_u16(404).unwrap();
        assert!(matches!(
            ApiError::from_status(status, "no such person"),
            ApiError::PersonNotFound(_)
        ));

        let status = reqwest::StatusCode::from_u16(503).unwrap();
        assert!(matches!(
            ApiError::from_status(status, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_truncation_lands_on_char_boundary() {
        // A multi-byte character straddling the byte cap must not panic
        let status = reqwest::StatusCode::from_u16(500).unwrap();
        let body = "€".repeat(200);
        let err = ApiError::from_status(status, &body);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let status = reqwest::StatusCode::from_u16(500).unwrap();
        let body = "x".repeat(2000);
        let err = ApiError::from_status(status, &body);
        let msg = err.to_string();
        assert!(msg.len() < 700);
        assert!(msg.contains("truncated"));
    }
}
