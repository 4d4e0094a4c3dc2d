pub mod account;
pub mod chat;
pub mod friend;
pub mod report;

use actix_web::{http::StatusCode, HttpResponse, Responder};
use serde::Serialize;
use std::future::{ready, Ready};

#[derive(Serialize, Debug)]
pub struct ErrorModel {
    #[serde(skip_serializing)]
    pub code: u16,
    pub error: String,
}

/// Every handler resolves to either a flat success body or an `ErrorModel`
/// rendered with its status code.
#[derive(Debug)]
pub enum ApiResult<T: Serialize> {
    Ok(T),
    Err(ErrorModel),
}

impl<T: Serialize> ApiResult<T> {
    pub fn err(code: u16, message: &str) -> Self {
        ApiResult::Err(ErrorModel {
            code,
            error: message.to_string(),
        })
    }
}

impl<T: Serialize> Responder for ApiResult<T> {
    type Error = actix_web::Error;

    type Future = Ready<Result<HttpResponse, actix_web::Error>>;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> Self::Future {
        ready(Ok(match self {
            ApiResult::Ok(data) => HttpResponse::Ok().json(&data),
            ApiResult::Err(err) => {
                let status = StatusCode::from_u16(err.code)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                HttpResponse::build(status).json(&err)
            }
        }))
    }
}

#[derive(Serialize, Debug)]
pub struct AckModel {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AckModel {
    pub fn ok() -> Self {
        AckModel {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: &str) -> Self {
        AckModel {
            success: true,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_only_the_error_field() {
        let err = ErrorModel {
            code: 400,
            error: "Evidence required".to_string(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "Evidence required" }));
    }

    #[test]
    fn ack_omits_absent_message() {
        let value = serde_json::to_value(&AckModel::ok()).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true }));

        let value = serde_json::to_value(&AckModel::with_message("Friend request sent")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "success": true, "message": "Friend request sent" })
        );
    }
}
