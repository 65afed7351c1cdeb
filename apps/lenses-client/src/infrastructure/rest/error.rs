//! REST error mapping.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::application::ports::QuotaError;

/// Error body returned by the administration API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Human readable message.
    #[serde(default, alias = "error")]
    pub message: String,
}

/// Map a non-success response to a quota error.
///
/// The message comes from a JSON `message` field when present, otherwise
/// from the raw body.
pub(crate) fn map_status(status: StatusCode, body: &str) -> QuotaError {
    match status {
        StatusCode::NOT_FOUND => QuotaError::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QuotaError::NotAccessible,
        _ => {
            let message = match serde_json::from_str::<ApiErrorResponse>(body) {
                Ok(err) if !err.message.is_empty() => err.message,
                _ => body.trim().to_string(),
            };
            QuotaError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl From<reqwest::Error> for QuotaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Json(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(404 => QuotaError::NotFound ; "not found")]
    #[test_case(401 => QuotaError::NotAccessible ; "unauthorized")]
    #[test_case(403 => QuotaError::NotAccessible ; "forbidden")]
    fn maps_known_statuses(code: u16) -> QuotaError {
        map_status(StatusCode::from_u16(code).unwrap(), "")
    }

    #[test]
    fn api_error_uses_json_message() {
        let err = map_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"invalid producer_byte_rate"}"#,
        );
        assert_eq!(
            err,
            QuotaError::Api {
                status: 400,
                message: "invalid producer_byte_rate".into()
            }
        );
    }

    #[test]
    fn api_error_falls_back_to_body() {
        let err = map_status(StatusCode::INTERNAL_SERVER_ERROR, "boom\n");
        assert_eq!(
            err,
            QuotaError::Api {
                status: 500,
                message: "boom".into()
            }
        );
    }
}
